//! CLI (Command Line Interface) mode
//!
//! 天気チャットボットの対話型 REPL。地名は Tab で補完できます。
//! 非対話の一回実行モードもサポートします。

use std::borrow::Cow;
use std::sync::Arc;

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Span, Suggestion,
};
use tracing::info;

use wx_api::AppState;
use wx_core::suggest::suggest;
use wx_core::{ChatService, ConversationTurn, LocationDirectory, Reply};

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "ヘルプを表示"),
    ("/exit", "プログラムを終了"),
    ("/quit", "プログラムを終了"),
    ("/clear", "会話履歴をクリア"),
    ("/history", "会話履歴を表示"),
    ("/places", "地名を検索 (例: /places san)"),
];

/// Completer for slash commands and place names
#[derive(Clone)]
pub struct LocationCompleter {
    commands: Vec<(&'static str, &'static str)>,
    directory: Arc<LocationDirectory>,
}

impl LocationCompleter {
    pub fn new(directory: Arc<LocationDirectory>) -> Self {
        Self {
            commands: COMMANDS.to_vec(),
            directory,
        }
    }

    fn complete_command(&self, line: &str, pos: usize) -> Vec<Suggestion> {
        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }

    /// Complete the word under the cursor against regions and places
    fn complete_place(&self, line: &str, pos: usize) -> Vec<Suggestion> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line[start..pos];
        if word.is_empty() {
            return Vec::new();
        }

        let mut seen = Vec::new();
        suggest(&self.directory, word)
            .into_iter()
            .filter_map(|s| {
                let description = match &s {
                    wx_core::Suggestion::State { .. } => "state".to_string(),
                    wx_core::Suggestion::City { state, .. } => state.clone(),
                };
                let name = s.name().to_string();
                if seen.contains(&name) {
                    return None;
                }
                seen.push(name.clone());
                Some(Suggestion {
                    value: name,
                    description: Some(description),
                    extra: None,
                    span: Span::new(start, pos),
                    append_whitespace: true,
                    style: None,
                })
            })
            .collect()
    }
}

impl Completer for LocationCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let pos = pos.min(line.len());
        if line.starts_with('/') && !line[..pos].contains(' ') {
            self.complete_command(&line[..pos], pos)
        } else {
            self.complete_place(line, pos)
        }
    }
}

/// Custom prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(self.style.paint("wx> ").to_string())
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
}

/// Outcome of a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    /// Not a command; send to the chatbot
    NotCommand,
    /// Handled; read the next line
    Handled,
    /// Leave the REPL
    Exit,
}

/// Run CLI interactive mode
pub async fn run_cli(state: AppState) -> anyhow::Result<()> {
    info!("Starting CLI mode with {} regions", state.directory.len());

    // Welcome message
    print_welcome();

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("completion_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(LocationCompleter::new(Arc::clone(&state.directory))))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(default_keybindings())));

    let prompt = ColoredPrompt::new();

    // Conversation history (this session only)
    let mut history: Vec<ConversationTurn> = Vec::new();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let input = line.trim();

                if input.is_empty() {
                    continue;
                }

                match handle_command(input, &mut history, &state.directory) {
                    CommandOutcome::Exit => {
                        println!("\n👋 さようなら！\n");
                        break;
                    }
                    CommandOutcome::Handled => continue,
                    CommandOutcome::NotCommand => {}
                }

                let turn = state.chat.respond(input).await;
                print_turn(&turn);
                history.push(turn);
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("\n👋 さようなら！\n");
                break;
            }
            Err(err) => {
                eprintln!("\n❌ エラー: {}\n", err);
                break;
            }
        }
    }

    Ok(())
}

/// 非対話モード: メッセージを一度だけ送信して終了
pub async fn run_execute(state: AppState, message: &str) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("メッセージが空です");
    }

    let turn = ask(&state.chat, message).await;
    match &turn.reply {
        Reply::Text(text) => {
            println!("{}", text);
            Ok(())
        }
        Reply::Failed { error } => Err(anyhow::anyhow!("{}", error)),
    }
}

async fn ask(chat: &ChatService, message: &str) -> ConversationTurn {
    let turn = chat.respond(message).await;
    if let Some(location) = &turn.resolved_location {
        info!("Answered for location {}", location);
    }
    turn
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    // Tab key triggers completion
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    // Esc key clears/closes menus
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('c'), ReedlineEvent::CtrlC);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::CtrlD);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

/// Handle special commands (/exit, /clear, /help, /history, /places)
fn handle_command(
    input: &str,
    history: &mut Vec<ConversationTurn>,
    directory: &LocationDirectory,
) -> CommandOutcome {
    let lower = input.to_lowercase();
    let (command, arg) = match lower.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (lower.as_str(), ""),
    };

    match command {
        "/exit" | "/quit" | "/q" => CommandOutcome::Exit,
        "/clear" => {
            history.clear();
            println!("\n✅ 会話履歴をクリアしました。\n");
            CommandOutcome::Handled
        }
        "/help" | "/?" => {
            print_help();
            CommandOutcome::Handled
        }
        "/history" => {
            print_history(history);
            CommandOutcome::Handled
        }
        "/places" => {
            print_places(directory, arg);
            CommandOutcome::Handled
        }
        _ if command.starts_with('/') => {
            eprintln!(
                "\n❓ 不明なコマンド: {}。/help でコマンド一覧を確認してください。\n",
                input
            );
            CommandOutcome::Handled
        }
        _ => CommandOutcome::NotCommand,
    }
}

/// Print one chatbot turn
fn print_turn(turn: &ConversationTurn) {
    if turn.corrected_message != turn.original_message {
        println!(
            "{}",
            Style::new()
                .dimmed()
                .paint(format!("(補正: {})", turn.corrected_message))
        );
    }

    match &turn.reply {
        Reply::Text(text) => println!("\n{}\n", text),
        Reply::Failed { error } => eprintln!("\n❌ エラー: {}\n", error),
    }
}

/// Print welcome message
fn print_welcome() {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          🌤  wx-gateway CLI - 天気チャット                  ║");
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  都市名を含むメッセージを入力して Enter で送信              ║");
    println!("║  コマンド: /help, /exit, /clear, /history, /places          ║");
    println!("║  Tab で地名を補完できます                                   ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
}

/// Print help message
fn print_help() {
    println!();
    println!("📖 利用可能なコマンド:");
    for (cmd, desc) in COMMANDS {
        println!("  {} - {}", cmd, desc);
    }
    println!();
    println!("💡 ヒント: 地名の途中まで入力して Tab で候補を表示します");
    println!("💡 矢印キー(↑/↓)で候補を選択、Enterで確定できます");
    println!();
}

/// Print matching regions and places
fn print_places(directory: &LocationDirectory, query: &str) {
    let matches = suggest(directory, query);
    println!();
    if matches.is_empty() {
        println!("🔍 \"{}\" に一致する地名はありません", query);
    }
    for s in &matches {
        match s {
            wx_core::Suggestion::State { name } => println!("  🗺  {}", name),
            wx_core::Suggestion::City { name, state } => println!("  📍 {}, {}", name, state),
        }
    }
    println!();
}

/// Print conversation history
fn print_history(history: &[ConversationTurn]) {
    println!();
    println!("📜 会話履歴 ({} 件):", history.len());
    println!("{}", "─".repeat(50));

    for (i, turn) in history.iter().enumerate() {
        let reply = match &turn.reply {
            Reply::Text(text) => text.clone(),
            Reply::Failed { error } => format!("エラー: {}", error),
        };
        let preview: String = reply.chars().take(100).collect();
        let ellipsis = if reply.chars().count() > 100 { "..." } else { "" };
        println!("{}. 👤 {}", i + 1, turn.original_message);
        println!("   🤖 {}{}", preview.replace('\n', " "), ellipsis);
    }

    println!("{}", "─".repeat(50));
    println!();
}
