use calendar_journal::app::{App, Control};
use calendar_journal::config::{Config, JournalMode};
use calendar_journal::form::DraftForm;
use calendar_journal::logging::init_logging;
use calendar_journal::storage::FileStorage;
use calendar_journal::ui::UI;
use calendar_journal::{DateKey, DiaryEntry, InterviewData, JournalEntry, RecordStore};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::from_env()?;
    let log_path = init_logging(&config.data_dir, &config.log_level)?;
    info!(mode = %config.mode, log = %log_path.display(), "starting calendar journal");

    let storage = FileStorage::new(&config.data_dir)?;
    info!(
        data_dir = %storage.dir().display(),
        export_dir = %config.export_dir.display(),
        "storage ready"
    );
    match config.mode {
        JournalMode::Diary => run::<DiaryEntry>(storage, &config),
        JournalMode::Interview => run::<InterviewData>(storage, &config),
    }
}

fn run<E>(storage: FileStorage, config: &Config) -> Result<()>
where
    E: JournalEntry,
    E::Draft: DraftForm,
{
    let store = RecordStore::<E, _>::load(storage)
        .wrap_err_with(|| format!("failed to load saved {}", E::STORAGE_KEY))?;
    let mut app = App::new(store, DateKey::today(), config.export_dir.clone());
    let mut ui = UI::new()?;

    loop {
        app.refresh_today(DateKey::today());
        ui.display(&app)?;

        let key = ui.next_key()?;
        if app.handle_key(key) == Control::Quit {
            break;
        }
    }

    info!("shutting down");
    Ok(())
}
