//! Action enum: all user-initiated intents flowing from components to the App.

use sort_proto::bucket::Bucket;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    LivePanel,
    StatsPanel,
    GalleryList,
    EditModal,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Live session ─────────────────────────────────────────────────────────
    Guess(Bucket),
    OpenOverride,
    CloseOverride,
    Override(Bucket),

    // ── Gallery navigation ───────────────────────────────────────────────────
    SelectUp(usize),
    SelectDown(usize),
    SelectFirst,
    SelectLast,
    ToggleView,

    // ── Gallery bulk mode ────────────────────────────────────────────────────
    ToggleBulk,
    ToggleSelect(String), // filename
    SelectAll,
    RequestBulkDelete,

    // ── Gallery record operations ────────────────────────────────────────────
    EditRecord(String),
    SaveClassification {
        filename: String,
        classification: String,
        confidence: String,
    },
    CancelEdit,
    RequestDelete(String),
    Confirm,
    CancelConfirm,
    RefreshGallery,
    CopyToClipboard(String),

    // ── Workspace / UI ───────────────────────────────────────────────────────
    SwitchWorkspace(Workspace),
    NextWorkspace,
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Noop,
}

/// Which workspace (tab) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    Live,    // scan / guess / reveal
    Gallery, // stored classifications + stats
}

impl Workspace {
    pub fn label(self) -> &'static str {
        match self {
            Workspace::Live => "LIVE",
            Workspace::Gallery => "GALLERY",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Workspace::Live => Workspace::Gallery,
            Workspace::Gallery => Workspace::Live,
        }
    }
}
