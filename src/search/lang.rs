use clap::ValueEnum;

/// Wikipedia edition used for related-term discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    #[default]
    Ja,
    En,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::Ja => "ja",
            Lang::En => "en",
        }
    }

    /// Title of the section that conventionally lists related pages.
    pub fn related_section_label(self) -> &'static str {
        match self {
            Lang::Ja => "関連項目",
            Lang::En => "See also",
        }
    }
}
