use chrono::{DateTime, Local};
use docform_core::{CollapseState, EditSession, FieldKind, Path, SaveOpts};
use eframe::{App, egui};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Default)]
struct State {
    file: Option<PathBuf>,
    session: Option<EditSession>,
    collapse: CollapseState,
    // Text typed into leaf inputs, committed on focus loss
    drafts: HashMap<Path, String>,
    status: String,
    backup_on_save: bool,
    confirm_save: bool,
    show_diff: bool,
    last_saved: Option<DateTime<Local>>,
}

impl State {
    fn clear_document(&mut self) {
        self.session = None;
        self.collapse = CollapseState::new();
        self.drafts.clear();
        self.confirm_save = false;
    }
}

struct AppGui {
    state: State,
}

impl AppGui {
    fn new(_cc: &eframe::CreationContext<'_>, file: Option<PathBuf>) -> Self {
        let mut app = Self {
            state: State {
                backup_on_save: true,
                ..Default::default()
            },
        };
        if let Some(p) = file {
            app.open(p);
        }
        app
    }
    fn pick_file(&mut self) {
        if let Some(p) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_directory(".")
            .pick_file()
        {
            self.open(p);
        }
    }
    fn open(&mut self, path: PathBuf) {
        self.state.clear_document();
        match docform_core::load_file(&path) {
            Ok(session) => {
                self.state.status = format!("Loaded {}", path.display());
                self.state.session = Some(session);
                self.state.file = Some(path);
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed");
                self.state.status = format!("Load error: {}", e);
                self.state.file = None;
            }
        }
    }
    fn apply_edits(&mut self, edits: Vec<(Path, String)>) {
        let Some(session) = &self.state.session else {
            return;
        };
        let mut next = session.clone();
        for (path, raw) in edits {
            match next.commit(&path, &raw) {
                Ok(s) => {
                    next = s;
                    self.state.drafts.remove(&path);
                }
                // keep the draft so the typed text is not lost
                Err(e) => self.state.status = format!("Edit error: {}", e),
            }
        }
        self.state.collapse.retain_existing(next.working());
        self.state.session = Some(next);
    }
    fn reset(&mut self) {
        if let Some(session) = &self.state.session {
            self.state.session = Some(session.reset());
            self.state.drafts.clear();
            self.state.status = "Reverted to loaded document".into();
        }
    }
    fn save(&mut self) {
        let (Some(path), Some(session)) = (&self.state.file, &self.state.session) else {
            return;
        };
        let opts = SaveOpts {
            backup: self.state.backup_on_save,
            ..SaveOpts::default()
        };
        match docform_core::save_file(path, session.working(), &opts) {
            Ok(backup) => {
                // the saved document becomes the new original
                let saved = EditSession::load(session.working());
                self.state.status = match backup {
                    Some(zip) => format!("Saved (backup {})", zip.display()),
                    None => "Saved".into(),
                };
                self.state.session = Some(saved);
                self.state.last_saved = Some(Local::now());
            }
            Err(e) => self.state.status = format!("Save error: {}", e),
        }
    }
}

impl App for AppGui {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open JSON…").clicked() {
                    self.pick_file();
                }
                let loaded = self.state.session.is_some();
                let dirty = self.state.session.as_ref().is_some_and(|s| s.is_dirty());
                if ui.add_enabled(dirty, egui::Button::new("Save")).clicked() {
                    self.state.confirm_save = true;
                }
                if ui.add_enabled(dirty, egui::Button::new("Reset")).clicked() {
                    self.reset();
                }
                ui.separator();
                if ui.add_enabled(loaded, egui::Button::new("Collapse all")).clicked()
                    && let Some(s) = &self.state.session
                {
                    self.state.collapse.collapse_all(s.working());
                }
                if ui.add_enabled(loaded, egui::Button::new("Expand all")).clicked() {
                    self.state.collapse.expand_all();
                }
                ui.checkbox(&mut self.state.show_diff, "Show changes");
                ui.checkbox(&mut self.state.backup_on_save, "Zip backup on save");
                if let Some(time) = self.state.last_saved {
                    ui.label(format!("Last save: {}", time.format("%Y-%m-%d %H:%M:%S")));
                }
            });
            if self.state.confirm_save {
                ui.horizontal(|ui| {
                    let target = self
                        .state
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    ui.label(format!("Overwrite {}?", target));
                    if ui.button("Confirm").clicked() {
                        self.save();
                        self.state.confirm_save = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.state.confirm_save = false;
                    }
                });
            }
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.state.status);
        });

        if self.state.show_diff
            && let Some(session) = &self.state.session
        {
            egui::SidePanel::right("changes")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("Changes");
                    let diff = session.diff();
                    if diff.is_empty() {
                        ui.label("No changes");
                    }
                    egui::ScrollArea::vertical()
                        .id_source("diff_scroll")
                        .show(ui, |ui| {
                            for (path, change) in &diff {
                                let show = |v: &Option<serde_json::Value>| {
                                    v.as_ref().map(|v| v.to_string()).unwrap_or("(absent)".into())
                                };
                                ui.monospace(path.to_string());
                                ui.label(format!(
                                    "  {} → {}",
                                    show(&change.before),
                                    show(&change.after)
                                ));
                            }
                        });
                });
        }

        let mut edits: Vec<(Path, String)> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let State {
                session,
                collapse,
                drafts,
                file,
                ..
            } = &mut self.state;
            let Some(session) = session else {
                ui.label("Open a JSON document to edit it.");
                return;
            };
            if let Some(p) = file {
                ui.heading(p.display().to_string());
            }
            ui.separator();
            let root = session.working();
            if !root.is_object() && !root.is_array() {
                ui.label(format!(
                    "Document root is a {:?} value and has no fields: {}",
                    FieldKind::of(root),
                    docform_core::display_text(root)
                ));
                return;
            }
            let writable = session.is_writable();
            if !writable {
                ui.weak("Read-only: only documents with an object at the root can be edited.");
            }
            egui::ScrollArea::vertical()
                .id_source("fields_scroll")
                .show(ui, |ui| {
                    field_tree(ui, root, &Path::root(), writable, collapse, drafts, &mut edits);
                });
        });
        if !edits.is_empty() {
            self.apply_edits(edits);
        }
    }
}

// Renders the children of `path`: branches as foldable groups, leaves as
// inputs (labels when not `writable`). Edits are collected and applied
// after the frame is drawn.
fn field_tree(
    ui: &mut egui::Ui,
    root: &serde_json::Value,
    path: &Path,
    writable: bool,
    collapse: &mut CollapseState,
    drafts: &mut HashMap<Path, String>,
    edits: &mut Vec<(Path, String)>,
) {
    let Ok(fields) = docform_core::children(root, path) else {
        return;
    };
    for f in fields {
        ui.push_id(f.path.to_pointer(), |ui| {
            let key = f.key.clone().unwrap_or_default();
            if f.kind.is_branch() {
                let folded = collapse.is_collapsed(&f.path);
                ui.horizontal(|ui| {
                    if ui.small_button(if folded { "▶" } else { "▼" }).clicked() {
                        collapse.toggle(&f.path);
                    }
                    ui.strong(&key);
                    ui.weak(&f.text);
                });
                if !folded {
                    ui.indent("children", |ui| {
                        field_tree(ui, root, &f.path, writable, collapse, drafts, edits);
                    });
                }
                return;
            }
            ui.horizontal(|ui| {
                ui.label(&key);
                if f.kind == FieldKind::Toggle {
                    let mut on = f.text == "true";
                    if ui
                        .add_enabled(writable, egui::Checkbox::new(&mut on, ""))
                        .changed()
                    {
                        edits.push((f.path.clone(), on.to_string()));
                    }
                    return;
                }
                if !writable {
                    ui.monospace(&f.text);
                    return;
                }
                let draft = drafts
                    .entry(f.path.clone())
                    .or_insert_with(|| f.text.clone());
                let resp = ui.text_edit_singleline(draft);
                if resp.lost_focus() && *draft != f.text {
                    edits.push((f.path.clone(), draft.clone()));
                }
                if f.kind == FieldKind::Empty {
                    ui.weak("null");
                }
            });
        });
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docform_gui=info,docform_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let file = std::env::args_os().nth(1).map(PathBuf::from);
    let native_options = eframe::NativeOptions {
        viewport: egui::viewport::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "docform",
        native_options,
        Box::new(move |cc| Ok(Box::new(AppGui::new(cc, file)))),
    )
}
