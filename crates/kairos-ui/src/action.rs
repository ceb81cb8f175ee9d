//! Requests from the panels to the app layer.

/// Which field a dictation result is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationTarget {
    Nombre,
    Dni,
    Edad,
    Message,
}

/// What the app should do after a frame
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Start,
    CaptureIdentity {
        nombre: String,
        dni: String,
        edad: String,
    },
    SendMessage(String),
    GenerateDiagnosis,
    PrintReceipt,
    Finalize,
    Reset,
    Dictate(DictationTarget),
    ToggleVoice,
    OpenAdmin,
    CloseAdmin,
    Admin(AdminAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    /// Re-read every admin store
    Reload,
    /// Create or update from the form, depending on `AdminState::editing`
    SaveProduct,
    EditProduct(u64),
    DeleteProduct(u64),
    CancelEdit,
    Export,
    /// Import the pasted tab-separated sheet
    ImportSheet,
    /// Load the pasted JSON usage log export
    ImportUsage,
    ClearUsage,

    ImportHistory,
    ClearHistory,
    /// Re-run the history query from the filter inputs
    FilterHistory,
    OpenConsultation(u64),
    CloseConsultation,

    ImportLearning,
    ClearLearning,
    PatternPage(usize),
    /// The intent dropdown changed
    FilterPatterns,

    SaveAiSettings,
    SaveGeneralSettings,
    CheckBackend,
    /// Persist the typed backend URL and restart
    SaveBackendUrl,
    ClearBackendUrl,
}
