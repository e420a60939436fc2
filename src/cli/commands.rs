use crate::cli::args::{
    AppsArgs, Args, Command, ConfigCommand, FormArgs, InstallArgs, LoaderArgs, LogsArgs, TableArgs, TcpStatusArgs,
};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::field::{FieldCollection, FieldSpec, FormDefinition};
use crate::core::form::FormOutcome;
use crate::core::installer::InstallerState;
use crate::core::loader::{self, LoaderExit, Severity, SpinnerKind};
use crate::core::logview::SharedLogBuffer;
use crate::core::table::{PageSizeSources, TableView};
use crate::domain::config::XtuiConfig;
use crate::domain::error::{XtuiError, XtuiResult};
use crate::infrastructure::clipboard::Osc52Clipboard;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::{default_log_path, init_logging, LogOptions};
use crate::infrastructure::logsource::LogSources;
use crate::infrastructure::packages::{installed_apps, AppFilter, AptPackageManager, APPS_HEADERS};
use crate::infrastructure::probe::probe;
use crate::tui::app::{App, Screen};
use crate::tui::screens::table::rows_for_height;
use crate::tui::screens::{FormScreen, InstallerScreen, LoaderScreen, LogScreen, TableScreen};
use crate::tui::theme::Theme;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Everything a command needs besides its own arguments
struct Context {
    config: XtuiConfig,
    config_manager: ConfigManager,
    writer: ConsoleWriter,
}

impl Context {
    fn theme(&self) -> Theme {
        Theme::default().with_overrides(&self.config.styles)
    }

    fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.config.global.tick_rate_ms.max(1))
    }

    fn export_dir(&self) -> PathBuf {
        self.config.global.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Execute CLI command
pub async fn execute_command(args: Args) -> XtuiResult<()> {
    let config_manager = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(XtuiError::Config {
                    message: format!("Configuration file not found: {}", path.display()),
                });
            }
            ConfigManager::with_path(path)
        }
        None => ConfigManager::new()?,
    };
    let config = config_manager.load_config()?;

    // Initialize logging
    let log_options = LogOptions {
        level: config.global.log_level.clone(),
        verbose: args.verbose,
        quiet: args.quiet,
        file: args.log_file.clone(),
    };
    if let Err(e) = init_logging(&log_options) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    debug!(command = ?args.command, "Executing command");

    let mut ctx = Context {
        config,
        config_manager,
        writer: ConsoleWriter::new(args.output),
    };

    match args.command {
        Command::Install(install_args) => execute_install(install_args, &mut ctx).await,
        Command::Form(form_args) => execute_form(form_args, &mut ctx).await,
        Command::Loader(loader_args) => execute_loader(loader_args, &mut ctx).await,
        Command::Table(table_args) => execute_table(table_args, &mut ctx).await,
        Command::Apps(apps_args) => execute_apps(apps_args, &mut ctx).await,
        Command::Logs(logs_args) => execute_logs(logs_args, &mut ctx).await,
        Command::TcpStatus(tcp_args) => execute_tcp_status(tcp_args, &mut ctx).await,
        Command::Config(config_args) => execute_config_command(config_args.command, &mut ctx),
        Command::Version => {
            ctx.writer
                .write_message(&format!("xtui {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Take over the terminal for one screen; it is restored before this returns.
async fn run_screen<S: Screen>(
    tick_rate: Duration,
    screen: &mut S,
    messages: Option<mpsc::Receiver<S::Message>>,
) -> XtuiResult<()> {
    let mut app = App::new(tick_rate)?;
    app.run(screen, messages).await
}

async fn execute_install(args: InstallArgs, ctx: &mut Context) -> XtuiResult<()> {
    let state = InstallerState::new(args.applications)?;
    let manager = Arc::new(AptPackageManager {
        path: args.path,
        assume_yes: args.yes,
        quiet: args.apt_quiet,
    });

    let (mut screen, results) = InstallerScreen::new(state, manager, ctx.theme());
    run_screen(ctx.tick_rate(), &mut screen, Some(results)).await?;
    let report = screen.into_result()?;

    info!(installed = report.installed.len(), total = report.total, cancelled = report.cancelled, "Installer finished");
    ctx.writer.write_install_report(&report)?;
    Ok(())
}

fn load_form(args: FormArgs) -> XtuiResult<FieldCollection> {
    let Some(path) = args.file else {
        let fields = args.fields.into_iter().map(FieldSpec::into_field).collect();
        return Ok(FieldCollection::new(args.title, fields));
    };

    let text = std::fs::read_to_string(&path)?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut definition = FormDefinition::parse(&text, is_json)?;
    if definition.title.is_empty() {
        definition.title = args.title;
    }
    Ok(definition.into_collection())
}

async fn execute_form(args: FormArgs, ctx: &mut Context) -> XtuiResult<()> {
    let collection = load_form(args)?;
    let labels = collection.headers();

    let mut screen = FormScreen::new(collection, ctx.theme());
    run_screen(ctx.tick_rate(), &mut screen, None).await?;

    match screen.into_outcome() {
        Some(FormOutcome::Submitted(result)) => ctx.writer.write_submission(&labels, &result)?,
        Some(FormOutcome::Cancelled) | None => info!("Form cancelled, no result produced"),
    }
    Ok(())
}

async fn execute_loader(args: LoaderArgs, ctx: &mut Context) -> XtuiResult<()> {
    let loader_config = &ctx.config.loader;
    let spinner: SpinnerKind = args.icon.as_deref().unwrap_or(&loader_config.spinner).parse()?;
    let delay = Duration::from_millis(args.delay.unwrap_or(loader_config.delay_ms));

    let mut styles = ctx.config.styles.clone();
    styles.extend(args.colors);
    let theme = Theme::default().with_overrides(&styles);

    let (handle, inbox) = loader::channel(loader_config.capacity);
    let producer = tokio::spawn(handle.feed(args.messages, delay, args.progress));

    let mut screen = LoaderScreen::new(loader_config.max_messages, spinner, theme);
    let result = run_screen(ctx.tick_rate(), &mut screen, Some(inbox.into_receiver())).await;
    producer.abort();
    result?;

    match screen.exit() {
        Some(LoaderExit::Interrupted) => ctx.writer.write_notice(Severity::Warning, "Loader interrupted")?,
        Some(LoaderExit::Completed) | None => debug!("Loader completed"),
    }
    Ok(())
}

/// Headers plus rows from a CSV file; short rows are padded later by the view.
fn read_csv_table(path: &Path) -> XtuiResult<(Vec<String>, Vec<Vec<String>>)> {
    let csv_err = |e: csv::Error| XtuiError::InvalidInput(format!("{}: {}", path.display(), e));
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(csv_err)?.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

fn split_row(row: &str) -> Vec<String> {
    row.split(',').map(|cell| cell.trim().to_string()).collect()
}

async fn execute_table(args: TableArgs, ctx: &mut Context) -> XtuiResult<()> {
    let (headers, rows) = match &args.file {
        Some(path) => read_csv_table(path)?,
        None => (
            args.headers.iter().map(|h| h.trim().to_string()).collect(),
            args.rows.iter().map(|row| split_row(row)).collect(),
        ),
    };
    if headers.is_empty() {
        return Err(XtuiError::InvalidInput(
            "a table needs at least one column (--headers or --file)".to_string(),
        ));
    }

    let sources = PageSizeSources::from_env(args.page_size, ctx.config.table.page_size);
    let mut view = TableView::new(headers, rows, sources.resolve());
    if let Some(filter) = args.filter {
        view.set_filter(filter);
    }
    show_table(args.title, view, sources.follows_terminal(), args.plain, ctx).await
}

async fn execute_apps(args: AppsArgs, ctx: &mut Context) -> XtuiResult<()> {
    let filter = AppFilter {
        name: args.name,
        status: args.status,
        method: args.method,
    };
    let apps = installed_apps(&filter).await?;
    info!(count = apps.len(), "Loaded installed applications");

    let headers = APPS_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = apps.into_iter().map(|app| app.into_row()).collect();
    let sources = PageSizeSources::from_env(args.page_size, ctx.config.table.page_size);
    let view = TableView::new(headers, rows, sources.resolve());
    show_table("Installed applications".to_string(), view, sources.follows_terminal(), args.plain, ctx).await
}

async fn show_table(
    title: String,
    mut view: TableView,
    follow_terminal: bool,
    plain: bool,
    ctx: &mut Context,
) -> XtuiResult<()> {
    if plain {
        let rows = view.filtered_rows();
        ctx.writer.write_rows(view.headers(), &rows)?;
        return Ok(());
    }

    let mut app = App::new(ctx.tick_rate())?;
    if follow_terminal {
        if let Some(height) = app.terminal_height() {
            view.set_page_size(rows_for_height(height));
        }
    }
    let mut screen = TableScreen::new(title, view, ctx.theme(), Box::new(Osc52Clipboard::stdout()))
        .with_export_dir(ctx.export_dir())
        .with_auto_page_size(follow_terminal);
    app.run(&mut screen, None).await
}

async fn execute_logs(args: LogsArgs, ctx: &mut Context) -> XtuiResult<()> {
    let buffer = SharedLogBuffer::default();
    let tree_dir = args
        .dir
        .or_else(|| default_log_path().and_then(|path| path.parent().map(Path::to_path_buf)));
    let sources = LogSources::start(&args.command, tree_dir, &buffer)?;

    let colors: HashMap<String, String> = args.colors.into_iter().collect();
    let mut screen = LogScreen::new(buffer, ctx.theme()).with_module_colors(&colors);
    let result = run_screen(ctx.tick_rate(), &mut screen, None).await;
    drop(sources);
    result
}

async fn execute_tcp_status(args: TcpStatusArgs, ctx: &mut Context) -> XtuiResult<()> {
    let report = probe(&args.target, Duration::from_secs(args.timeout.max(1))).await?;
    ctx.writer.write_probe(&report)?;
    Ok(())
}

fn execute_config_command(command: ConfigCommand, ctx: &mut Context) -> XtuiResult<()> {
    match command {
        ConfigCommand::Show => {
            ctx.writer.write_config(&ctx.config)?;
            Ok(())
        }
        ConfigCommand::Init { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let created = ctx.config_manager.init_project_config(&dir)?;
            ctx.writer
                .write_notice(Severity::Success, &format!("Created {}", created.display()))?;
            Ok(())
        }
        ConfigCommand::Validate => {
            let issues = ConfigManager::validate(&ctx.config);
            if issues.is_empty() {
                ctx.writer.write_notice(Severity::Success, "Configuration is valid")?;
                return Ok(());
            }
            for issue in &issues {
                ctx.writer.write_notice(Severity::Warning, issue)?;
            }
            Err(XtuiError::Config {
                message: format!("{} configuration issue(s) found", issues.len()),
            })
        }
        ConfigCommand::Path => {
            let global = ctx.config_manager.global_config_path().display().to_string();
            ctx.writer.write_message(&format!("global: {}", global))?;
            match ctx.config_manager.project_config_path() {
                Some(project) => ctx
                    .writer
                    .write_message(&format!("project: {}", project.display()))?,
                None => ctx.writer.write_message("project: (none)")?,
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_split_row_trims_cells() {
        assert_eq!(split_row("nginx, installed ,"), vec!["nginx", "installed", ""]);
    }

    #[test]
    fn test_read_csv_table_is_flexible() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Name,Status").unwrap();
        writeln!(file, "nginx,installed").unwrap();
        writeln!(file, "\"curl, libcurl\"").unwrap();

        let (headers, rows) = read_csv_table(file.path()).unwrap();
        assert_eq!(headers, vec!["Name", "Status"]);
        assert_eq!(rows[1], vec!["curl, libcurl"]);
    }

    #[test]
    fn test_form_file_title_falls_back_to_flag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{"fields": [{"placeholder": "Host"}]}"#).unwrap();

        let collection = load_form(FormArgs {
            title: "Connect".into(),
            fields: Vec::new(),
            file: Some(path),
        })
        .unwrap();
        assert_eq!(collection.title(), "Connect");
        assert_eq!(collection.headers(), vec!["Host"]);
    }
}
