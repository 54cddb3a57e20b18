use clap::{Parser, ValueEnum};
use reelnoteapp::commands::RunOptions;
use reelnoteapp::content::Section;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ContentSection {
    Overview,
    Info,
    Seasons,
}

impl From<ContentSection> for Section {
    fn from(section: ContentSection) -> Self {
        match section {
            ContentSection::Overview => Section::Overview,
            ContentSection::Info => Section::Info,
            ContentSection::Seasons => Section::Seasons,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "reelnote", bin_name = "reelnote", version)]
#[command(
    about = "Fetch covers, runtime, genres and TMDB ids for movie and TV notes",
    long_about = None
)]
pub struct Cli {
    /// A markdown note or a directory of notes
    pub path: PathBuf,

    /// Force re-search even if a TMDB ID is already stored
    #[arg(short, long, help_heading = "Options")]
    pub force: bool,

    /// Generate TMDB content sections in the note body
    #[arg(short, long, help_heading = "Options")]
    pub generate_content: bool,

    /// Sections to generate [default: all that apply to the media type]
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        help_heading = "Options"
    )]
    pub content_sections: Vec<ContentSection>,

    /// Config file [default: reelnote.toml in the user config dir]
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, help_heading = "Options")]
    pub verbose: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions::new(&self.path)
            .with_force(self.force)
            .with_generate_content(self.generate_content)
            .with_sections(self.content_sections.iter().copied().map(Section::from).collect())
    }
}
