use qrscan_types::{Screen, UiEvent, ViewSnapshot};

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    App(UiEvent),
    /// Paging only changes what the terminal shows
    NextPage,
    PrevPage,
}

/// Map one line of terminal input to an action on the current screen.
///
/// Keys are single letters; history entries are picked by their 1-based row number,
/// which stays the same on every page.
pub fn parse_command(line: &str, view: &ViewSnapshot) -> Option<Command> {
    let input = line.trim().to_ascii_lowercase();

    if view.screen == Screen::History && !view.confirm_clear {
        match input.as_str() {
            ">" | "]" => return Some(Command::NextPage),
            "<" | "[" => return Some(Command::PrevPage),
            _ => {}
        }
    }

    parse_event(&input, view).map(Command::App)
}

fn parse_event(input: &str, view: &ViewSnapshot) -> Option<UiEvent> {
    if input == "q" {
        return Some(UiEvent::Quit);
    }

    match view.screen {
        Screen::Home => match input {
            "s" => Some(UiEvent::StartScan),
            "h" => Some(UiEvent::ShowHistory),
            _ => None,
        },
        Screen::Scanning => match input {
            "x" | "b" => Some(UiEvent::CloseScanner),
            _ => None,
        },
        Screen::Result => match input {
            "c" => Some(UiEvent::CopyResult),
            "o" => Some(UiEvent::OpenResult),
            "n" => Some(UiEvent::ScanAnother),
            "b" => Some(UiEvent::Back),
            _ => None,
        },
        Screen::History if view.confirm_clear => match input {
            "y" => Some(UiEvent::ConfirmClearHistory),
            "n" => Some(UiEvent::CancelClearHistory),
            _ => None,
        },
        Screen::History => match input {
            "d" => Some(UiEvent::RequestClearHistory),
            "b" => Some(UiEvent::Back),
            row => row
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=view.history.len()).contains(n))
                .map(|n| UiEvent::SelectHistory(n - 1)),
        },
    }
}
