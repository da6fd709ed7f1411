//! Interactive console session driving one room

use crate::commands::{library_lines, resolve_book};
use anyhow::{Context, Result};
use chaptercast_core::{AppError, LibraryEntry, RoomId, SelectOption, VoiceTarget};
use chaptercast_player::TransportController;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Books,
    Open(String),
    Chapter(usize),
    Chapters,
    PlayPause,
    Rewind,
    Forward,
    Next,
    Previous,
    Back,
    Controls,
    Status,
    Stop,
    Target(u64),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Input::Empty;
    };
    let arg = words.next();

    match (command.to_ascii_lowercase().as_str(), arg) {
        ("books" | "library" | "ls", _) => Input::Books,
        ("open" | "book", Some(selection)) => Input::Open(selection.to_string()),
        ("ch" | "chapter", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Chapter(n - 1),
            _ => Input::Unknown(line.trim().to_string()),
        },
        ("chapters", _) => Input::Chapters,
        ("p" | "play" | "pause", _) => Input::PlayPause,
        ("<<" | "rw" | "rewind", _) => Input::Rewind,
        (">>" | "ff" | "forward", _) => Input::Forward,
        ("n" | "next", _) => Input::Next,
        ("prev" | "previous", _) => Input::Previous,
        ("back", _) => Input::Back,
        ("controls", _) => Input::Controls,
        ("s" | "status", _) => Input::Status,
        ("stop", _) => Input::Stop,
        ("target", Some(id)) => match id.parse() {
            Ok(id) => Input::Target(id),
            Err(_) => Input::Unknown(line.trim().to_string()),
        },
        ("h" | "help" | "?", _) => Input::Help,
        ("q" | "quit" | "exit", _) => Input::Quit,
        _ => Input::Unknown(line.trim().to_string()),
    }
}

fn print_help() {
    println!("{}", style("Commands").bold());
    println!("  books              list the library");
    println!("  open N | N.M       select book N (or book M of series N)");
    println!("  chapters           list chapters of the selected book");
    println!("  ch N               play chapter N");
    println!("  p                  play/pause");
    println!("  << / >>            rewind / forward");
    println!("  next / prev        next / previous chapter");
    println!("  back               stop and return to the chapter list");
    println!("  controls           post a new status message");
    println!("  status             show the current status");
    println!("  target ID          move playback to another voice target");
    println!("  stop               stop and leave voice");
    println!("  quit               leave");
}

fn print_chapters(options: &[SelectOption]) {
    for (i, option) in options.iter().enumerate() {
        match option {
            SelectOption::Chapter(chapter) => println!("{:>3}. {}", i + 1, chapter.title),
            other => println!("{:>3}. {}", i + 1, other.label()),
        }
    }
}

fn report(error: &AppError) {
    log::debug!("{}", error);
    println!("{} {}", style("!").red().bold(), error.user_message());
}

/// Runs the command loop until `quit`, `stop`, end of input or Ctrl-C
pub async fn run(controller: &TransportController, room: RoomId, target: VoiceTarget) -> Result<()> {
    let mut entries: Vec<LibraryEntry> = controller
        .open_player(room, target)
        .await
        .context("Failed to open the player")?;
    for line in library_lines(&entries) {
        println!("{}", line);
    }
    println!("{}", style("Type 'help' for commands.").dim());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let result = match parse_input(&line) {
            Input::Empty => Ok(()),
            Input::Help => {
                print_help();
                Ok(())
            }
            Input::Books => match controller.open_player(room, target).await {
                Ok(fresh) => {
                    entries = fresh;
                    for line in library_lines(&entries) {
                        println!("{}", line);
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Input::Open(selection) => match resolve_book(&entries, &selection) {
                Some(book) => controller.select_book(room, &book).await.map(|chapters| {
                    print_chapters(&chapters.into_iter().map(SelectOption::from).collect::<Vec<_>>());
                }),
                None => {
                    println!("No book {} in the list.", selection);
                    Ok(())
                }
            },
            Input::Chapters => {
                print_chapters(&controller.chapter_options(room));
                Ok(())
            }
            Input::Chapter(index) => controller.select_chapter(room, index).await,
            Input::PlayPause => controller.toggle_pause(room).await,
            Input::Rewind => controller.rewind(room).await,
            Input::Forward => controller.forward(room).await,
            Input::Next => controller.next_chapter(room).await,
            Input::Previous => controller.previous_chapter(room).await,
            Input::Back => controller.return_to_chapter_list(room).await.map(|options| print_chapters(&options)),
            Input::Controls => controller.reopen_controls(room).await.map(|_| ()),
            Input::Status => {
                println!("{}", controller.view(room).to_text());
                Ok(())
            }
            Input::Target(id) => controller.set_voice_target(room, VoiceTarget::new(id)).await,
            Input::Stop => {
                match controller.stop_command(room).await {
                    Ok(()) => println!("Playback stopped and disconnected."),
                    Err(e) => report(&e),
                }
                break;
            }
            Input::Quit => break,
            Input::Unknown(text) => {
                println!("Unknown command '{}'. Type 'help'.", text);
                Ok(())
            }
        };

        if let Err(e) = result {
            report(&e);
        }
    }

    if controller.snapshot(room).is_some() {
        if let Err(e) = controller.quit(room).await {
            log::debug!("quit: {}", e);
        }
    }
    Ok(())
}
