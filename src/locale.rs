/// Display language for UI chrome. Concept content always comes back in
/// whatever language the service produces; this only affects labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }
}

/// Static string table for one language.
pub struct Strings {
    pub search: &'static str,
    pub query_selected_text: &'static str,
    pub search_online: &'static str,
    pub back: &'static str,
    pub forward: &'static str,
    pub loading: &'static str,
    pub no_selection: &'static str,
    pub enter_concept: &'static str,
    pub quit: &'static str,
}

const EN: Strings = Strings {
    search: "Search",
    query_selected_text: "Query Selected Text",
    search_online: "Search Online",
    back: "Back",
    forward: "Forward",
    loading: "Loading",
    no_selection: "No text selected",
    enter_concept: "Enter a concept...",
    quit: "Quit",
};

const ES: Strings = Strings {
    search: "Buscar",
    query_selected_text: "Consultar texto seleccionado",
    search_online: "Buscar en línea",
    back: "Atrás",
    forward: "Adelante",
    loading: "Cargando",
    no_selection: "Ningún texto seleccionado",
    enter_concept: "Escribe un concepto...",
    quit: "Salir",
};

pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::En => &EN,
        Language::Es => &ES,
    }
}
