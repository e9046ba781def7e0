//! New applet project scaffolding

use crate::config::{ConfigManager, CONFIG_FILE_NAMES};
use crate::error::{Result, SignageError};
use crate::files::IGNORE_FILE_NAME;
use std::path::{Path, PathBuf};

/// Inputs collected from flags or prompts
#[derive(Debug, Clone)]
pub struct BoilerplateOptions {
    pub name: String,
    pub description: Option<String>,
    pub target_dir: PathBuf,
    /// Write into a non-empty directory
    pub force: bool,
}

/// Turn a free-form title into a lowercase, hyphenated applet name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Write a runnable applet skeleton and return the created paths relative
/// to the target directory
pub async fn generate(options: &BoilerplateOptions) -> Result<Vec<String>> {
    let dir = &options.target_dir;
    if !options.force && is_non_empty_dir(dir).await? {
        return Err(SignageError::Validation(format!(
            "Directory {} is not empty (use --force to write into it)",
            dir.display()
        )));
    }
    tokio::fs::create_dir_all(dir).await?;

    let mut config = ConfigManager::create_default(&options.name);
    config.description = options.description.clone();
    config.ignore = vec!["*.map".to_string()];
    ConfigManager::new().save(&config, &dir.join(CONFIG_FILE_NAMES[0]))?;

    let files: [(&str, String); 4] = [
        ("index.html", index_html(&options.name)),
        ("main.js", MAIN_JS.to_string()),
        ("styles.css", STYLES_CSS.to_string()),
        (IGNORE_FILE_NAME, IGNORE_FILE.to_string()),
    ];
    for (name, content) in &files {
        tokio::fs::write(dir.join(name), content).await?;
    }

    let mut created = vec![CONFIG_FILE_NAMES[0].to_string()];
    created.extend(files.iter().map(|(name, _)| name.to_string()));
    Ok(created)
}

async fn is_non_empty_dir(dir: &Path) -> Result<bool> {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn index_html(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{name}</title>
    <link rel="stylesheet" href="styles.css" />
  </head>
  <body>
    <main id="content">
      <h1>{name}</h1>
      <p id="clock"></p>
    </main>
    <script src="main.js"></script>
  </body>
</html>
"#
    )
}

const MAIN_JS: &str = r#"function tick() {
  document.getElementById('clock').textContent = new Date().toLocaleTimeString();
}

tick();
setInterval(tick, 1000);
"#;

const STYLES_CSS: &str = r#"html, body {
  margin: 0;
  height: 100%;
  background: #101820;
  color: #f2f2f2;
  font-family: sans-serif;
}

#content {
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  height: 100%;
}
"#;

const IGNORE_FILE: &str = "# Paths excluded from applet upload\n*.log\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{collect_local_files, IgnoreRules};

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Lobby Clock!"), "lobby-clock");
        assert_eq!(slugify("  Menu  Board 2 "), "menu-board-2");
    }

    #[tokio::test]
    async fn test_generated_project_is_uploadable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("lobby-clock");
        let options = BoilerplateOptions {
            name: "lobby-clock".to_string(),
            description: Some("Clock for the lobby".to_string()),
            target_dir: target.clone(),
            force: false,
        };

        let created = generate(&options).await?;
        assert!(created.contains(&"index.html".to_string()));

        let (config, config_path) = ConfigManager::new().load_from_directory(&target)?;
        assert_eq!(config.name, "lobby-clock");
        let root = ConfigManager::root_dir(&config, &config_path);
        let rules = IgnoreRules::for_project(&root, &config.ignore)?;
        let files = collect_local_files(&root, &rules).await?;
        let paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["index.html", "main.js", "styles.css"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_refuses_non_empty_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("existing.txt"), "keep me")?;
        let options = BoilerplateOptions {
            name: "x".to_string(),
            description: None,
            target_dir: dir.path().to_path_buf(),
            force: false,
        };

        assert!(generate(&options).await.is_err());
        assert_eq!(std::fs::read_to_string(dir.path().join("existing.txt"))?, "keep me");
        Ok(())
    }
}
