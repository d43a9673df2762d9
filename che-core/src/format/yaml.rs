use super::{FormatError, Loaded, Loader, Writer};

/// YAML meta files, held as JSON values so both meta formats look the same downstream
pub struct YamlMeta;

impl Loader for YamlMeta {
    fn read(&self, raw: &[u8]) -> Result<Loaded, FormatError> {
        Ok(Loaded::Meta(serde_yaml::from_slice(raw)?))
    }
}

impl Writer for YamlMeta {
    fn write(&self, value: &Loaded) -> Result<Vec<u8>, FormatError> {
        let meta = value.as_meta().ok_or(FormatError::WrongKind {
            expected: "meta",
            found: value.kind(),
        })?;
        Ok(serde_yaml::to_string(meta)?.into_bytes())
    }
}
