use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;

mod config;
mod error;
mod mesh;
mod render;
mod state;
mod ui;

use config::GalleryConfig;
use mesh::MeshFormat;
use render::viewer::{Interaction, ViewerSession};
use state::gallery::{self, CardSet, SortKey};
use state::library::Library;
use state::tags;
use ui::card::{self, Preview};
use ui::dialog::Dialog;

/// Size the viewer renders at until the viewport reports its real size
const VIEWER_INITIAL_SIZE: (u32, u32) = (800, 560);

/// Main application state
struct MeshGallery {
    config: GalleryConfig,
    /// The catalog; the only owner of the record list
    library: Library,
    /// Cards currently in the grid, each holding its rendered preview
    cards: CardSet<Preview>,
    sort: SortKey,
    filter: String,
    dialog: Option<Dialog>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    AddModel,
    SortChanged(SortKey),
    FilterChanged(String),
    OpenViewer(String),
    CloseViewer,
    Viewer(Interaction),
    CopyToClipboard(String),
    RequestDelete(String),
    ConfirmDelete,
    EditTags(String),
    TagInputChanged(String),
    SaveTags,
    CancelDialog,
}

impl MeshGallery {
    fn new(config: GalleryConfig, library: Library) -> (Self, Task<Message>) {
        log::info!(
            "Gallery storage at {} ({} models)",
            library.root().display(),
            library.model_count()
        );
        let status = format!("Ready. {} models in gallery.", library.model_count());

        let mut app = MeshGallery {
            config,
            library,
            cards: CardSet::new(),
            sort: SortKey::default(),
            filter: String::new(),
            dialog: None,
            status,
        };
        app.refresh();

        (app, Task::none())
    }

    /// Re-run sort + filter and reconcile the grid, rendering only new cards
    fn refresh(&mut self) {
        let visible = gallery::list(self.library.models(), self.sort, &self.filter);
        let settings = &self.config.render;
        let stats = self
            .cards
            .reconcile(&visible, |model| card::build_preview(model, settings));

        log::debug!(
            "Gallery reconciled: {} reused, {} rendered, {} dropped",
            stats.reused,
            stats.created,
            stats.discarded
        );
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AddModel => {
                let picked = FileDialog::new()
                    .set_title("Select 3D Model")
                    .add_filter("3D Models", &MeshFormat::EXTENSIONS)
                    .pick_file();

                if let Some(path) = picked {
                    match self.library.add_model(&path, tags::default_tags()) {
                        Ok(model) => {
                            self.status = format!("Added {}.", model.name);
                            self.refresh();
                        }
                        Err(e) => {
                            log::error!("Failed to add {}: {}", path.display(), e);
                            self.status = format!("Could not add model: {}", e);
                        }
                    }
                }
            }
            Message::SortChanged(sort) => {
                self.sort = sort;
                self.refresh();
            }
            Message::FilterChanged(filter) => {
                self.filter = filter;
                self.refresh();
            }
            Message::OpenViewer(id) => {
                let Some(model) = self.library.get(&id) else {
                    return Task::none();
                };
                let (width, height) = VIEWER_INITIAL_SIZE;
                match ViewerSession::open(&model.file_path, self.config.render.clone(), width, height) {
                    Ok(session) => {
                        let frame = card::to_handle(session.render());
                        self.dialog = Some(Dialog::Viewer { session, frame });
                    }
                    Err(e) => {
                        log::warn!("Cannot open viewer for {}: {}", model.name, e);
                        self.status = format!("Could not open {}: {}", model.name, e);
                    }
                }
            }
            Message::CloseViewer | Message::CancelDialog => {
                // Dropping the dialog releases the viewer's mesh and buffers
                self.dialog = None;
            }
            Message::Viewer(interaction) => {
                if let Some(Dialog::Viewer { session, frame }) = &mut self.dialog {
                    if session.apply(interaction) {
                        *frame = card::to_handle(session.render());
                    }
                }
            }
            Message::CopyToClipboard(id) => match self.library.read_model_content(&id) {
                Some(bytes) => {
                    self.status = "Model content copied to clipboard!".to_string();
                    return iced::clipboard::write(String::from_utf8_lossy(&bytes).into_owned());
                }
                None => {
                    self.status = "Could not read model content!".to_string();
                }
            },
            Message::RequestDelete(id) => {
                if let Some(model) = self.library.get(&id) {
                    self.dialog = Some(Dialog::ConfirmDelete {
                        id,
                        name: model.name.clone(),
                    });
                }
            }
            Message::ConfirmDelete => {
                if let Some(Dialog::ConfirmDelete { id, name }) = self.dialog.take() {
                    match self.library.delete_model(&id) {
                        Ok(()) => {
                            self.cards.remove(&id);
                            self.status = format!("Deleted {}.", name);
                        }
                        Err(e) => {
                            log::error!("Failed to delete model {}: {}", id, e);
                            self.status = format!("Could not delete {}: {}", name, e);
                        }
                    }
                }
            }
            Message::EditTags(id) => {
                if let Some(model) = self.library.get(&id) {
                    self.dialog = Some(Dialog::EditTags {
                        input: tags::format_tags(&model.tags),
                        id,
                    });
                }
            }
            Message::TagInputChanged(value) => {
                if let Some(Dialog::EditTags { input, .. }) = &mut self.dialog {
                    *input = value;
                }
            }
            Message::SaveTags => {
                if let Some(Dialog::EditTags { id, input }) = self.dialog.take() {
                    let new_tags = tags::parse_tags(&input);
                    if let Err(e) = self.library.update_tags(&id, new_tags) {
                        log::error!("Failed to update tags for {}: {}", id, e);
                        self.status = format!("Could not save tags: {}", e);
                    } else if let Some(model) = self.library.get(&id) {
                        self.cards.update_model(model);
                        // Only the Tags ordering depends on tag contents
                        if self.sort == SortKey::Tags {
                            self.refresh();
                        }
                    }
                }
            }
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        if let Some(dialog) = &self.dialog {
            return dialog.view();
        }

        let controls = row![
            button("Add Model").on_press(Message::AddModel).padding(10),
            text("Sort by:"),
            pick_list(&SortKey::ALL[..], Some(self.sort), Message::SortChanged),
            text("Filter:"),
            text_input("Filter by name, tag, or date...", &self.filter)
                .on_input(Message::FilterChanged)
                .padding(6),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let grid: Column<Message> = self
            .cards
            .rows()
            .fold(Column::new().spacing(10), |grid, cards| {
                let cards_row = cards.iter().fold(row![].spacing(10), |r, c| {
                    r.push(card::view(&c.model, &c.visual))
                });
                grid.push(cards_row)
            });

        let grid: Element<Message> = if self.cards.is_empty() {
            text("No models to show.").size(16).into()
        } else {
            scrollable(grid).height(Length::Fill).into()
        };

        let content: Column<Message> = column![
            controls,
            grid,
            text(&self.status).size(14),
        ]
        .spacing(20)
        .padding(20);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GalleryConfig::from_env();

    // A catalog that cannot be read is fatal: starting empty would orphan stored files
    let library = match Library::new(&config.storage_root) {
        Ok(library) => library,
        Err(e) => {
            log::error!("An error occurred: {}", e);
            std::process::exit(1);
        }
    };

    iced::application("3D Model Gallery", MeshGallery::update, MeshGallery::view)
        .theme(MeshGallery::theme)
        .window_size((1000.0, 800.0))
        .centered()
        .run_with(move || MeshGallery::new(config, library))
}
