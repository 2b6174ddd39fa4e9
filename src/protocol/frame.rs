use super::*;
use crate::FRAME_SEPARATOR;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;

/// Reads the next NUL-terminated frame.
/// Returns `Ok(None)` at end of stream. Blank frames come back as empty strings.
pub async fn read_frame<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();
    match reader.read_until(FRAME_SEPARATOR, &mut buffer).await? {
        0 => Ok(None),
        _ => {
            if buffer.last() == Some(&FRAME_SEPARATOR) {
                buffer.pop();
            }
            Ok(Some(String::from_utf8_lossy(&buffer).trim().to_string()))
        }
    }
}

/// Wire bytes for one outgoing message, separator included.
pub fn frame(message: &Message) -> Vec<u8> {
    let mut bytes = message.encode().into_bytes();
    bytes.push(FRAME_SEPARATOR);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn frame_appends_separator() {
        assert_eq!(frame(&Message::new("z")), b"<Z/>\0".to_vec());
    }
    #[tokio::test]
    async fn read_frames_until_eof() {
        let ref mut reader = tokio::io::BufReader::new(&b"<Z/>\0\0<EXIT/>"[..]);
        assert_eq!(read_frame(reader).await.unwrap(), Some("<Z/>".to_string()));
        assert_eq!(read_frame(reader).await.unwrap(), Some(String::new()));
        assert_eq!(read_frame(reader).await.unwrap(), Some("<EXIT/>".to_string()));
        assert_eq!(read_frame(reader).await.unwrap(), None);
    }
}
