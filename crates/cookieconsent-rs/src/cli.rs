use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cookieconsent_rs_config::{
    ConsentService, FieldKind, FileSettingsStore, HostSettings, SettingsField, SiteId, catalog,
    emit,
};
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;

/// Command-line options for the consent configuration host.
#[derive(Debug, Parser)]
#[command(name = "cookieconsent", version)]
pub struct Cli {
    /// Optional path to a settings.json5 file
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    /// Store directory, overriding the settings file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    /// Site id, overriding the settings file
    #[arg(long, global = true)]
    pub site: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective configuration
    Effective,
    /// Print the inline script fragment
    Script,
    /// Print the stored value of a field, e.g. `guiOptions[consentModal][layout]`
    Get { field: String },
    /// Print the effective value at a bracket path, e.g. `[guiOptions][consentModal]`
    Query { path: String },
    /// Sanitize and store a single field
    Set { field: String, value: String },
    /// Remove a field override
    Reset { field: String },
    /// Apply a settings form submission given as NAME=VALUE pairs
    Submit {
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },
    /// List the admin field catalog, grouped by section
    Fields,
    /// List the bundled front-end assets served from a base URL
    Assets {
        #[arg(long)]
        base_url: String,
    },
    /// Remove the stored settings of every site
    Uninstall,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {raw:?}")),
    }
}

/// Execute one command, writing its output to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let settings = match cli.settings.as_ref() {
        Some(path) => {
            info!("loading settings from path: {}", path.display());
            HostSettings::load_from_path(path).context("failed to load settings")?
        }
        None => HostSettings::load_default().context("failed to load default settings")?,
    };
    let store_root = match cli.store {
        Some(root) => root,
        None => settings
            .resolved_store_root()
            .context("failed to resolve store directory")?,
    };
    let site = match cli.site {
        Some(id) => SiteId::new(id).context("invalid --site")?,
        None => settings.default_site.clone(),
    };
    debug!(
        "running command (site={site}, store={}, command={:?})",
        store_root.display(),
        cli.command
    );

    let mut service = ConsentService::new(
        FileSettingsStore::new(&store_root),
        &settings.site_context(),
    );

    match cli.command {
        Command::Effective => {
            let effective = service
                .effective_config(&site)
                .context("failed to build effective config")?;
            writeln!(out, "{}", emit::to_json_pretty(&effective)?)?;
        }
        Command::Script => {
            let script = service
                .inline_script(&site)
                .context("failed to render inline script")?;
            write!(out, "{script}")?;
        }
        Command::Get { field } => {
            let value = service
                .field_value(&site, &field)
                .with_context(|| format!("failed to read {field}"))?;
            writeln!(out, "{value}")?;
        }
        Command::Query { path } => {
            let value = service
                .lookup(&site, &path)
                .with_context(|| format!("failed to query {path}"))?;
            writeln!(out, "{value}")?;
        }
        Command::Set { field, value } => {
            let stored = service
                .set_field(&site, &field, &value)
                .with_context(|| format!("failed to set {field}"))?;
            writeln!(out, "{stored}")?;
        }
        Command::Reset { field } => {
            let removed = service
                .reset_field(&site, &field)
                .with_context(|| format!("failed to reset {field}"))?;
            if removed.is_none() {
                bail!("{field} has no stored override");
            }
        }
        Command::Submit { pairs } => {
            let saved = service
                .submit_form(&site, pairs)
                .context("failed to apply form submission")?;
            writeln!(out, "{}", emit::to_json_pretty(&saved)?)?;
        }
        Command::Fields => {
            let mut section = None;
            for field in catalog() {
                if section != Some(field.section) {
                    section = Some(field.section);
                    writeln!(
                        out,
                        "[{}] {}",
                        field.section.title(),
                        field.section.description()
                    )?;
                }
                writeln!(out, "  {}", describe_field(field))?;
            }
        }
        Command::Assets { base_url } => {
            for asset in emit::frontend_assets(&base_url) {
                writeln!(
                    out,
                    "{}\t{}\t{}?ver={}",
                    asset.kind.as_str(),
                    asset.handle,
                    asset.url,
                    asset.version
                )?;
            }
        }
        Command::Uninstall => {
            let removed = service.uninstall().context("failed to uninstall")?;
            writeln!(out, "removed {removed} record(s)")?;
        }
    }
    Ok(())
}

fn describe_field(field: &SettingsField) -> String {
    let kind = match field.kind {
        FieldKind::Select { options } => {
            let values: Vec<&str> = options.iter().map(|(value, _)| *value).collect();
            format!("select({})", values.join("|"))
        }
        FieldKind::Text => "text".to_string(),
        FieldKind::Textarea => "textarea".to_string(),
        FieldKind::Checkbox => "checkbox".to_string(),
    };
    format!("{}\t{}\t{}", field.field_name, kind, field.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct Host {
        _temp: TempDir,
        settings: PathBuf,
    }

    impl Host {
        fn new() -> Self {
            let temp = TempDir::new().expect("tmp");
            let settings = temp.path().join("settings.json5");
            let store = temp.path().join("store");
            fs::write(
                &settings,
                format!("{{ store_root: {:?}, default_site: '2' }}", store.display().to_string()),
            )
            .expect("settings");
            Self {
                _temp: temp,
                settings,
            }
        }

        fn run(&self, args: &[&str]) -> anyhow::Result<String> {
            let settings = self.settings.display().to_string();
            let mut argv = vec!["cookieconsent", "--settings", settings.as_str()];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv)?;
            let mut out = Vec::new();
            run(cli, &mut out)?;
            Ok(String::from_utf8(out)?)
        }
    }

    #[test]
    fn parses_submit_pairs() {
        let cli = Cli::try_parse_from([
            "cookieconsent",
            "submit",
            "wp_cookieconsent_options[mode]=opt-out",
            "wp_cookieconsent_options[revision]=",
        ])
        .expect("cli");
        let Command::Submit { pairs } = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(
            pairs,
            vec![
                (
                    "wp_cookieconsent_options[mode]".to_string(),
                    "opt-out".to_string()
                ),
                (
                    "wp_cookieconsent_options[revision]".to_string(),
                    String::new()
                ),
            ]
        );
        assert!(Cli::try_parse_from(["cookieconsent", "submit", "novalue"]).is_err());
    }

    #[test]
    fn set_then_get_and_query() {
        let host = Host::new();
        assert_eq!(
            host.run(&["set", "guiOptions[consentModal][layout]", "cloud"])
                .expect("set"),
            "cloud\n"
        );
        assert_eq!(
            host.run(&["get", "guiOptions[consentModal][layout]"])
                .expect("get"),
            "cloud\n"
        );
        assert_eq!(
            host.run(&["query", "[guiOptions][consentModal][position]"])
                .expect("query"),
            "bottom right\n"
        );
        assert_eq!(host.run(&["query", "autoShow"]).expect("query"), "true\n");
    }

    #[test]
    fn reset_without_override_fails() {
        let host = Host::new();
        assert!(host.run(&["reset", "mode"]).is_err());
        host.run(&["set", "mode", "opt-out"]).expect("set");
        host.run(&["reset", "mode"]).expect("reset");
        assert_eq!(host.run(&["query", "mode"]).expect("query"), "opt-in\n");
    }

    #[test]
    fn site_flag_selects_record() {
        let host = Host::new();
        host.run(&["--site", "7", "set", "mode", "opt-out"])
            .expect("set");
        assert_eq!(host.run(&["query", "mode"]).expect("query"), "opt-in\n");
        assert_eq!(
            host.run(&["--site", "7", "query", "mode"]).expect("query"),
            "opt-out\n"
        );
        assert!(host.run(&["--site", "../x", "query", "mode"]).is_err());
    }

    #[test]
    fn script_and_uninstall() {
        let host = Host::new();
        host.run(&["submit", "wp_cookieconsent_options[mode]=opt-out"])
            .expect("submit");
        let script = host.run(&["script"]).expect("script");
        assert!(script.contains(r#"CookieConsent.run({"mode":"opt-out""#));
        assert_eq!(
            host.run(&["uninstall"]).expect("uninstall"),
            "removed 1 record(s)\n"
        );
    }

    #[test]
    fn lists_catalog() {
        let host = Host::new();
        let listing = host.run(&["fields"]).expect("fields");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(
            lines[0],
            "[General Settings] Configure general cookie consent behavior."
        );
        assert_eq!(
            lines[1],
            "  mode\tselect(opt-in|opt-out)\tConsent Mode"
        );
        let headers = lines.iter().filter(|line| line.starts_with('[')).count();
        assert_eq!(headers, 4);
        assert_eq!(lines.len(), catalog().len() + headers);
        assert!(listing.contains("[Cookie Categories] Configure cookie categories."));
    }

    #[test]
    fn lists_versioned_assets() {
        let host = Host::new();
        let listing = host
            .run(&["assets", "--base-url", "https://example.com/plugin/"])
            .expect("assets");
        assert_eq!(
            listing,
            "style\tcookieconsent\thttps://example.com/plugin/assets/cookieconsent.css?ver=3.1.0\n\
             script\tcookieconsent\thttps://example.com/plugin/assets/cookieconsent.umd.js?ver=3.1.0\n"
        );
    }
}
