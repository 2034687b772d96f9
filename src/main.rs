use chrono::Utc;
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod media;
mod state;
mod ui;

use config::AppConfig;
use error::LoadFailure;
use media::assets::StaticAssets;
use media::loader::ImageLoader;
use media::{Generation, ImageSlot, ImageSourceResolver, SlotSignal};
use state::data::{Property, PropertyStatus, StatusChangeEntry};
use state::history::{BadgeKind, HistoryProjection, StatusHistoryProjector};
use state::library::{self, ImportResult, Library};
use state::session::Session;

/// Main application state
struct ListingDesk {
    /// The listing catalog
    library: Library,
    /// Render host for the image slot
    loader: ImageLoader,
    session: Session,
    session_path: Option<PathBuf>,
    resolver: ImageSourceResolver,
    projector: StatusHistoryProjector,
    properties: Vec<Property>,
    /// Property shown in the detail panel
    selected: Option<Property>,
    slot: ImageSlot,
    /// Decoded image for the slot's current generation
    image: Option<Handle>,
    /// `None` until a property's history has been read
    history: Option<HistoryProjection>,
    note_draft: String,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Import Listings" button
    ImportListings,
    /// Background import finished
    ImportComplete(Result<ImportResult, String>),
    SelectProperty(i64),
    /// Render host finished loading the source started for a generation
    ImageLoaded(Generation, Result<Handle, LoadFailure>),
    NoteChanged(String),
    ChangeStatus(PropertyStatus),
}

impl ListingDesk {
    fn new(config: AppConfig, library: Library) -> (Self, Task<Message>) {
        let session_path = Session::default_path();
        let session = match session_path.as_deref().map(Session::load) {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                warn!(error = %e, "Ignoring unreadable session");
                Session::default()
            }
            None => Session::default(),
        };

        let resolver = ImageSourceResolver::new(StaticAssets::bundled());
        let slot = ImageSlot::new(&resolver);

        let mut app = ListingDesk {
            library,
            loader: ImageLoader::new(config.source_roots()),
            session,
            session_path,
            resolver,
            projector: StatusHistoryProjector::new(config.display_zone()),
            properties: Vec::new(),
            selected: None,
            slot,
            image: None,
            history: None,
            note_draft: String::new(),
            status: String::new(),
        };
        app.refresh_properties();
        let property_count = app.library.property_count().unwrap_or(0);
        app.status = format!("Ready. {} properties in catalog.", property_count);
        info!(actor = %app.session.actor, properties = app.properties.len(), "Listing desk initialized");

        let task = match app.session.selected_property {
            Some(id) => app.select(id),
            None => Task::none(),
        };
        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ImportListings => {
                let file = FileDialog::new()
                    .set_title("Select Listing File")
                    .add_filter("Listings", &["json"])
                    .pick_file();

                if let Some(file_path) = file {
                    self.status = format!("Importing from {}...", file_path.display());
                    let db_path = self.library.path().clone();

                    return Task::perform(
                        import_listings_async(file_path, db_path),
                        Message::ImportComplete,
                    );
                }

                Task::none()
            }
            Message::ImportComplete(Ok(result)) => {
                self.status = format!(
                    "Import complete. Added {} listings, skipped {} duplicates, {} failed.",
                    result.imported_count, result.skipped_count, result.failed_count
                );
                self.refresh_properties();
                Task::none()
            }
            Message::ImportComplete(Err(e)) => {
                error!(error = %e, "Import failed");
                self.status = format!("Import failed: {}", e);
                Task::none()
            }
            Message::SelectProperty(id) => self.select(id),
            Message::ImageLoaded(generation, Ok(handle)) => {
                if self.slot.on_load_success(generation) == SlotSignal::Completed {
                    self.image = Some(handle);
                }
                Task::none()
            }
            Message::ImageLoaded(generation, Err(failure)) => {
                match self.slot.on_load_error(generation) {
                    SlotSignal::Substituted(_) => self.load_active_source(generation),
                    signal => {
                        debug!(
                            error = %failure,
                            ?signal,
                            phase = ?self.slot.phase(),
                            "Load failure absorbed"
                        );
                        Task::none()
                    }
                }
            }
            Message::NoteChanged(note) => {
                self.note_draft = note;
                Task::none()
            }
            Message::ChangeStatus(status) => {
                self.change_status(status);
                Task::none()
            }
        }
    }

    /// Show a property: read its history and start loading its image
    fn select(&mut self, property_id: i64) -> Task<Message> {
        let property = match self.library.get_property(property_id) {
            Ok(property) => property,
            Err(e) => {
                warn!(property_id, error = %e, "Cannot select property");
                self.status = e.to_string();
                return Task::none();
            }
        };

        self.history = self.read_history(property_id);
        let generation = self.slot.accept(&self.resolver, &property.image_ref);
        self.image = None;
        self.note_draft.clear();
        self.selected = Some(property);

        self.session.selected_property = Some(property_id);
        self.save_session();

        self.load_active_source(generation)
    }

    fn load_active_source(&self, generation: Generation) -> Task<Message> {
        Task::perform(
            self.loader.clone().load(self.slot.active_source().clone()),
            move |result| Message::ImageLoaded(generation, result),
        )
    }

    fn change_status(&mut self, status: PropertyStatus) {
        let Some(property_id) = self.selected.as_ref().map(|p| p.id) else {
            return;
        };

        let note = self.note_draft.trim();
        let entry = StatusChangeEntry {
            status,
            changed_by: self.session.actor.clone(),
            changed_at: Utc::now(),
            notes: (!note.is_empty()).then(|| note.to_string()),
        };

        match self.library.record_status_change(property_id, &entry) {
            Ok(()) => {
                self.status = format!("Marked as {}.", BadgeKind::for_status(&entry.status).label());
                self.note_draft.clear();
                self.history = self.read_history(property_id);
                if let Some(selected) = self.selected.as_mut() {
                    selected.status = entry.status;
                }
                self.refresh_properties();
                self.save_session();
            }
            Err(e) => {
                error!(property_id, error = %e, "Failed to record status change");
                self.status = format!("Could not change status: {}", e);
            }
        }
    }

    fn read_history(&self, property_id: i64) -> Option<HistoryProjection> {
        match self.library.get_history(property_id) {
            Ok(entries) => Some(self.projector.project(&entries)),
            Err(e) => {
                warn!(property_id, error = %e, "Failed to read status history");
                None
            }
        }
    }

    fn refresh_properties(&mut self) {
        match self.library.get_all_properties() {
            Ok(properties) => self.properties = properties,
            Err(e) => warn!(error = %e, "Failed to read properties"),
        }
    }

    fn save_session(&self) {
        if let Some(path) = &self.session_path {
            if let Err(e) = self.session.save(path) {
                warn!(error = %e, "Failed to save session");
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let list = self
            .properties
            .iter()
            .fold(Column::new().spacing(6), |list, property| {
                list.push(
                    button(
                        row![
                            text(property.title.clone()).width(Length::Fill),
                            ui::badge::view(&BadgeKind::for_status(&property.status)),
                        ]
                        .spacing(8)
                        .align_y(Alignment::Center),
                    )
                    .on_press(Message::SelectProperty(property.id))
                    .style(button::secondary)
                    .width(Length::Fill),
                )
            });

        let sidebar: Column<Message> = column![
            button("Import Listings")
                .on_press(Message::ImportListings)
                .padding(10),
            text(&self.status).size(14),
            scrollable(list).height(Length::Fill),
        ]
        .spacing(16)
        .width(Length::Fixed(300.0));

        let detail: Element<Message> = match &self.selected {
            Some(property) => self.detail_view(property),
            None => container(text("Select a property").size(18))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        container(row![sidebar, detail].spacing(32))
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn detail_view(&self, property: &Property) -> Element<'_, Message> {
        let status_buttons = PropertyStatus::SELECTABLE.into_iter().fold(
            row![].spacing(8),
            |buttons, status| {
                let label = BadgeKind::for_status(&status).label().to_string();
                buttons.push(button(text(label)).on_press(Message::ChangeStatus(status)))
            },
        );

        let history: Element<Message> = match &self.history {
            Some(projection) => ui::history::view(projection),
            None => text("History unavailable").size(14).into(),
        };

        column![
            text(property.title.clone()).size(28),
            ui::card::view(&self.slot, self.image.as_ref()),
            status_buttons,
            text_input("Note (optional)", &self.note_draft).on_input(Message::NoteChanged),
            text("History").size(20),
            history,
        ]
        .spacing(16)
        .width(Length::Fill)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    let config_error = AppConfig::default_path().map(|path| AppConfig::load(&path));
    let config = match &config_error {
        Some(Ok(config)) => config.clone(),
        _ => AppConfig::default(),
    };

    init_tracing(&config.log_filter);
    if let Some(Err(e)) = config_error {
        warn!(error = %e, "Using default configuration");
    }

    let library = match config
        .database_path
        .clone()
        .map(Ok)
        .unwrap_or_else(Library::default_path)
        .and_then(|path| Library::open(&path))
    {
        Ok(library) => library,
        Err(e) => {
            error!(error = %e, "Failed to open the listing catalog");
            std::process::exit(1);
        }
    };

    iced::application("Listing Desk", ListingDesk::update, ListingDesk::view)
        .theme(ListingDesk::theme)
        .centered()
        .run_with(move || ListingDesk::new(config, library))
}

/// `RUST_LOG` wins over the configured filter
fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Import a listing file on a background task.
/// Opens its own connection; `rusqlite::Connection` is not `Send`.
async fn import_listings_async(file_path: PathBuf, db_path: PathBuf) -> Result<ImportResult, String> {
    info!(file = %file_path.display(), "Importing listings");

    let listings = library::read_listing_file(&file_path).map_err(|e| e.to_string())?;
    let mut conn = Connection::open(&db_path).map_err(|e| e.to_string())?;
    Ok(library::import_listings(&mut conn, &listings))
}
