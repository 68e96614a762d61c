use crate::utils::error::{Result, ScrapeError};
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE_EXTENSIONS: &[&str] = &["csv", "txt"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScrapeError::invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScrapeError::invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(ScrapeError::invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ScrapeError::invalid(
            field_name,
            value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScrapeError::invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, path: &Path, allowed: &[&str]) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)) => Ok(()),
        Some(ext) => Err(ScrapeError::invalid(
            field_name,
            path.display().to_string(),
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed.join(", ")
            ),
        )),
        None => Err(ScrapeError::invalid(
            field_name,
            path.display().to_string(),
            "File has no extension or invalid filename",
        )),
    }
}

/// The identifier list must be an existing `.csv` or `.txt` file.
pub fn validate_project_file(field_name: &str, path: &Path) -> Result<PathBuf> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(ScrapeError::invalid(field_name, shown, "That file path does not exist"));
    }
    if path.is_dir() {
        return Err(ScrapeError::invalid(
            field_name,
            shown,
            "The path must point to a file, not a folder",
        ));
    }
    validate_file_extension(field_name, path, PROJECT_FILE_EXTENSIONS)?;
    Ok(path.to_path_buf())
}

pub fn validate_output_dir(field_name: &str, path: &Path) -> Result<PathBuf> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(ScrapeError::invalid(field_name, shown, "That folder does not exist"));
    }
    if !path.is_dir() {
        return Err(ScrapeError::invalid(
            field_name,
            shown,
            "That path does not point to a directory",
        ));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("browser.webdriver_url", "http://localhost:9515").is_ok());
        assert!(validate_url("portal.base_url", "https://mdotjboss.state.mi.us/CCI/").is_ok());
        assert!(validate_url("portal.base_url", "").is_err());
        assert!(validate_url("portal.base_url", "invalid-url").is_err());
        assert!(validate_url("portal.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timing.retry_attempts", 2, 1).is_ok());
        assert!(validate_positive_number("timing.retry_attempts", 0, 1).is_err());
    }

    #[test]
    fn test_validate_project_file() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("projects.txt");
        let xlsx = dir.path().join("projects.xlsx");
        std::fs::write(&txt, "12345\n").unwrap();
        std::fs::write(&xlsx, "").unwrap();

        assert!(validate_project_file("projects", &txt).is_ok());
        assert!(validate_project_file("projects", &xlsx).is_err());
        assert!(validate_project_file("projects", dir.path()).is_err());
        assert!(validate_project_file("projects", &dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_validate_output_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("out.csv");
        std::fs::write(&file, "").unwrap();

        assert!(validate_output_dir("output_dir", dir.path()).is_ok());
        assert!(validate_output_dir("output_dir", &file).is_err());
        assert!(validate_output_dir("output_dir", &dir.path().join("nope")).is_err());
    }
}
