use crate::Config;
use crate::error::{ErrorKind, Result};

impl Config {
    /// Reject values that deserialize fine but cannot drive a run.
    ///
    /// Quality is range-checked while deserializing.
    pub fn validate(&self) -> Result<()> {
        self.convert.bounds()?;
        self.resize.bounds()?;
        non_empty("convert.extensions", &self.convert.extensions)?;
        non_empty("pdf.extensions", &self.pdf.extensions)?;
        non_empty("resize.extensions", &self.resize.extensions)?;
        for (key, value) in [
            ("convert.output", &self.convert.output),
            ("pdf.folder", &self.pdf.folder),
            ("pdf.name", &self.pdf.name),
            ("collect.folder", &self.collect.folder),
        ] {
            if value.trim().is_empty() {
                exn::bail!(ErrorKind::Invalid(format!("{key} must not be empty")));
            }
        }
        if !(self.pdf.dpi.is_finite() && self.pdf.dpi > 0.0) {
            exn::bail!(ErrorKind::Invalid(format!("pdf.dpi must be positive, got {}", self.pdf.dpi)));
        }
        Ok(())
    }
}

fn non_empty(key: &str, extensions: &[String]) -> Result<()> {
    if extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
        exn::bail!(ErrorKind::Invalid(format!("{key} must list at least one extension")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[rstest]
    #[case::zero_width(|c: &mut Config| c.convert.max_width = Some(0))]
    #[case::zero_height(|c: &mut Config| c.resize.max_height = Some(0))]
    #[case::no_extensions(|c: &mut Config| c.convert.extensions.clear())]
    #[case::blank_extension(|c: &mut Config| c.pdf.extensions = vec![" . ".to_string()])]
    #[case::empty_template(|c: &mut Config| c.convert.output = "  ".to_string())]
    #[case::zero_dpi(|c: &mut Config| c.pdf.dpi = 0.0)]
    #[case::nan_dpi(|c: &mut Config| c.pdf.dpi = f32::NAN)]
    fn test_rejects(#[case] mutate: fn(&mut Config)) {
        let mut config = Config::default();
        mutate(&mut config);
        let err = config.validate().unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));
    }
}
