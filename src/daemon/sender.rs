use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// Port FBI listens on for remote installs
pub const FBI_PORT: u16 = 5000;

/// Download URL the console fetches the title from
pub fn download_url(host: &str, name: &str) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("http://{}/api/download?name={}", host, escaped)
}

/// Big-endian u32 length prefix followed by the URL bytes
pub fn encode_payload(url: &str) -> io::Result<Vec<u8>> {
    let len = u32::try_from(url.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "url too long"))?;

    let mut payload = Vec::with_capacity(4 + url.len());
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(url.as_bytes());
    Ok(payload)
}

/// Hand the URL to FBI on the console at `address`
pub async fn push_to_console(address: &str, url: &str) -> io::Result<()> {
    send_payload((address, FBI_PORT), url).await
}

pub async fn send_payload(target: impl ToSocketAddrs, url: &str) -> io::Result<()> {
    let mut stream = TcpStream::connect(target).await?;
    debug!("send {} to {}", url, stream.peer_addr()?);

    stream.write_all(&encode_payload(url)?).await?;
    stream.shutdown().await
}
