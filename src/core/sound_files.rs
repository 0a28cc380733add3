use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Adhan,
    Reminder,
    Elapsed,
}

impl SoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adhan => "adhan",
            Self::Reminder => "reminder",
            Self::Elapsed => "elapsed",
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Adhan => "adhan-file-selected",
            Self::Reminder => "reminder-file-selected",
            Self::Elapsed => "elapsed-file-selected",
        }
    }

    pub fn file_name_for(&self, source: &Path) -> String {
        match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("custom-{}.{}", self.as_str(), ext),
            None => format!("custom-{}", self.as_str()),
        }
    }
}

pub fn import_sound(source: &Path, data_dir: &Path, kind: SoundKind) -> Result<PathBuf> {
    if !source.is_file() {
        anyhow::bail!("not a file: {}", source.display());
    }

    fs::create_dir_all(data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;

    let dest = data_dir.join(kind.file_name_for(source));
    fs::copy(source, &dest)
        .with_context(|| format!("copy {} -> {}", source.display(), dest.display()))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_with_kind_prefix_and_original_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("My Adhan.MP3");
        fs::write(&src, b"ID3").expect("write");

        let data = dir.path().join("data");
        let dest = import_sound(&src, &data, SoundKind::Adhan).expect("import");
        assert_eq!(dest, data.join("custom-adhan.MP3"));
        assert_eq!(fs::read(&dest).expect("read"), b"ID3");

        fs::write(&src, b"newer").expect("write");
        let again = import_sound(&src, &data, SoundKind::Adhan).expect("import");
        assert_eq!(again, dest);
        assert_eq!(fs::read(&dest).expect("read"), b"newer");
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = import_sound(&dir.path().join("gone.wav"), dir.path(), SoundKind::Elapsed)
            .unwrap_err();
        assert!(format!("{err:#}").contains("gone.wav"));
    }

    #[test]
    fn extensionless_source_keeps_bare_name() {
        assert_eq!(
            SoundKind::Reminder.file_name_for(Path::new("/tmp/chime")),
            "custom-reminder"
        );
        assert_eq!(SoundKind::Reminder.event_name(), "reminder-file-selected");
    }
}
