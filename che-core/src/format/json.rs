use super::{FormatError, Loaded, Loader, Writer};

/// JSON meta files
pub struct JsonMeta;

impl Loader for JsonMeta {
    fn read(&self, raw: &[u8]) -> Result<Loaded, FormatError> {
        Ok(Loaded::Meta(serde_json::from_slice(raw)?))
    }
}

impl Writer for JsonMeta {
    fn write(&self, value: &Loaded) -> Result<Vec<u8>, FormatError> {
        let meta = value.as_meta().ok_or(FormatError::WrongKind {
            expected: "meta",
            found: value.kind(),
        })?;
        let mut out = serde_json::to_vec_pretty(meta)?;
        out.push(b'\n');
        Ok(out)
    }
}
