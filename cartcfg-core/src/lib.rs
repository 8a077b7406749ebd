pub mod error;

pub mod config;

pub mod controller {
    pub mod keymap;
    pub use keymap::{KeyBindings, Keymap, NavKey};

    pub mod navigator;
    pub use navigator::{PageNavigator, SelectionOutcome, select, select_from};
}

pub mod model {
    pub mod file_list;
    pub use file_list::FileListModel;

    pub mod page_state;
    pub use page_state::{PageState, Transition};
}

pub mod view {
    pub mod console;
    pub use console::{Console, RowView, ScreenLayout};

    pub mod prompt;

    pub mod terminal;
    pub use terminal::{CrosstermConsole, TerminalSession};
}

pub mod protocol {
    pub mod command;
    pub use command::{CommandEncoder, CommandRequest, RegisterFrame, RegisterWrite};

    pub mod transport;
    pub use transport::{MmapTransport, RegisterTransport, WindowTransport, dispatch};
}

pub mod logging;
pub use logging::LoggerBuilder;

pub use error::AppError;

pub use controller::navigator::SelectionOutcome;
pub use model::file_list::FileListModel;
