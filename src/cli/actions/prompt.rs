use anyhow::{bail, Result};
use secrecy::SecretString;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Prompts on stderr and reads one line from stdin.
pub(super) async fn read_secret(prompt: &str) -> Result<SecretString> {
    let mut stderr = io::stderr();
    stderr.write_all(prompt.as_bytes()).await?;
    stderr.flush().await?;

    let mut line = String::new();
    if BufReader::new(io::stdin()).read_line(&mut line).await? == 0 {
        bail!("no input on stdin");
    }
    Ok(SecretString::from(line.trim().to_string()))
}
