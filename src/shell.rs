//! Shell: command dispatch and the session lifecycle.
//!
//! [`Shell::dispatch`] works on a [`Context`] only, so every command can
//! be exercised without a terminal. [`run`] wires the shell to the
//! terminal, restores the previous session and persists it on exit.

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::compositor::{Compositor, Context, ReadOutcome};
use crate::config::Config;
use crate::editor::Capabilities;
use crate::error::{Result, StreamError};
use crate::history::{load_history, save_history, HistoryStore};
use crate::output::{
    load_session_log, restore_into, save_session_log, time_banner, OutputBuffer, READING_CUE,
};
use crate::stream::{
    event_channel, load_subscriptions, save_subscriptions, StreamClient, SubscribeOutcome,
    TokenStore, WsConnector, TOKEN_PROMPT,
};

/// Event type prefixed to bare symbols (`SPY` becomes `AM.SPY`).
pub const DEFAULT_EVENT: &str = "AM";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `exit`, `quit`, `q`
    Exit,
    /// `help`, `h`, `?`
    Help,
    /// `echo <text>`
    Echo(String),
    /// `time`
    Time,
    /// `commands`, `history`
    History,
    /// `subscribe <channel>`, `sub <channel>`
    Subscribe(String),
    /// `unsubscribe <channel>`, `unsub <channel>`
    Unsubscribe(String),
    /// `streams`
    Streams,
    /// `example <command>`, `ex <command>`
    Example(String),
    /// Anything else, handed to the [`CommandHandler`].
    External(String),
}

impl Command {
    /// Parse a trimmed line. Command words are case-insensitive.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        match word.to_ascii_lowercase().as_str() {
            "exit" | "quit" | "q" => Self::Exit,
            "help" | "h" | "?" => Self::Help,
            "echo" => Self::Echo(rest.to_string()),
            "time" => Self::Time,
            "commands" | "history" => Self::History,
            "subscribe" | "sub" => Self::Subscribe(rest.to_string()),
            "unsubscribe" | "unsub" => Self::Unsubscribe(rest.to_string()),
            "streams" => Self::Streams,
            "example" | "ex" => Self::Example(rest.to_string()),
            _ => Self::External(line.to_string()),
        }
    }
}

/// Turn user input into a channel identifier.
pub fn normalize_channel(input: &str) -> String {
    let input = input.trim().to_ascii_uppercase();
    if input.contains('.') {
        input
    } else {
        format!("{DEFAULT_EVENT}.{input}")
    }
}

/// A worked example for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// What the example shows.
    pub summary: String,
    /// Command line placed in the editor.
    pub template: String,
}

impl Example {
    /// Build an example.
    pub fn new(summary: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            template: template.into(),
        }
    }
}

/// What an external command wants done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Lines to print.
    pub lines: Vec<String>,
    /// Text to place in the editor for the next read.
    pub prefill: Option<String>,
}

impl Reply {
    /// A reply that prints one line.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            prefill: None,
        }
    }
}

/// Commands implemented outside the terminal engine (pricing, REST data).
pub trait CommandHandler {
    /// Run `line`.
    fn handle(&mut self, line: &str) -> Reply;

    /// Example for the command called `name`, if it has one.
    fn example(&self, _name: &str) -> Option<Example> {
        None
    }
}

/// Handler used when no external commands are installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrecognized;

impl CommandHandler for Unrecognized {
    fn handle(&mut self, _line: &str) -> Reply {
        Reply::line("Unrecognized command")
    }
}

/// What the read loop does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Read another line.
    Continue,
    /// End the session.
    Exit,
    /// Subscribing needs an API token; prompt for it, then retry `channel`.
    NeedToken(String),
}

/// Welcome text shown when there is no previous session.
pub const ABOUT: &[&str] = &[
    "",
    "Options Numerics",
    "Copyright 2023 Johnathan K. Burchill",
    "",
    "This program comes with ABSOLUTELY NO WARRANTY.",
    "",
    "This is free software, and you are welcome to redistribute",
    "it under the terms of the GNU General Public License Version 3.",
    "For details look at the LICENSE file in the source code.",
    "",
    "UP and DOWN arrow keys cycle the command history",
    "h assists, q desists",
    "",
];

const BUILTINS: &[(&str, &str)] = &[
    ("help or h", "prints this summary"),
    ("echo <text>", "prints its arguments"),
    ("time", "prints the current time"),
    ("commands", "lists remembered commands and how often each was used"),
    ("subscribe <symbol>", "adds a symbol to the live stream panel"),
    ("unsubscribe <symbol>", "removes a symbol from the live stream panel"),
    ("streams", "lists subscriptions and reconnects restored ones"),
    ("example <command>", "puts an example of a command on the input line"),
    ("exit, quit or q", "ends the session"),
];

const KEYS: &[(&str, &str)] = &[
    ("UP / DOWN", "cycle the command history"),
    ("TAB", "complete from history"),
    ("CTRL-P", "recall the most used command"),
    ("PAGE UP / PAGE DOWN", "scroll the output"),
    ("CTRL-F", "search the output"),
    ("CTRL-R", "repeat the search upwards"),
];

fn builtin_example(name: &str) -> Option<Example> {
    let example = match name {
        "echo" => Example::new("Print some text:", "echo Hello, trader"),
        "time" => Example::new("Show the local and UTC time:", "time"),
        "subscribe" | "sub" => Example::new("Stream minute aggregates for a stock:", "subscribe SPY"),
        "unsubscribe" | "unsub" => Example::new("Stop streaming a stock:", "unsubscribe SPY"),
        _ => return None,
    };
    Some(example)
}

/// Print `text` as program output.
pub fn say(context: &mut Context, text: &str) {
    context.print(&format!("{READING_CUE}{text}"));
}

/// Command dispatcher.
pub struct Shell {
    handler: Box<dyn CommandHandler>,
    prefill: Option<String>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("prefill", &self.prefill)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Dispatcher forwarding unknown commands to `handler`.
    pub fn new(handler: Box<dyn CommandHandler>) -> Self {
        Self {
            handler,
            prefill: None,
        }
    }

    /// Text for the next read's editor, if a command asked for it.
    pub fn take_prefill(&mut self) -> Option<String> {
        self.prefill.take()
    }

    /// Run one submitted line.
    pub fn dispatch(&mut self, context: &mut Context, line: &str, now: DateTime<Local>) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        let command = Command::parse(line);
        if command != Command::Exit {
            context.history_mut().remember(line);
        }
        self.execute(context, command, now)
    }

    /// Run a parsed command.
    pub fn execute(&mut self, context: &mut Context, command: Command, now: DateTime<Local>) -> Flow {
        match command {
            Command::Exit => return Flow::Exit,
            Command::Help => help(context),
            Command::Echo(text) => say(context, &text),
            Command::Time => context.print(&time_banner("", now)),
            Command::History => list_history(context),
            Command::Subscribe(symbol) => {
                if symbol.is_empty() {
                    say(context, "Usage: subscribe <symbol>");
                } else {
                    return subscribe(context, &normalize_channel(&symbol));
                }
            }
            Command::Unsubscribe(symbol) => {
                if symbol.is_empty() {
                    say(context, "Usage: unsubscribe <symbol>");
                } else {
                    unsubscribe(context, &normalize_channel(&symbol));
                }
            }
            Command::Streams => return streams(context),
            Command::Example(name) => self.example(context, &name),
            Command::External(line) => {
                let reply = self.handler.handle(&line);
                for text in &reply.lines {
                    say(context, text);
                }
                if reply.prefill.is_some() {
                    self.prefill = reply.prefill;
                }
            }
        }
        Flow::Continue
    }

    fn example(&mut self, context: &mut Context, name: &str) {
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            say(context, "Usage: example <command>");
            return;
        }
        match builtin_example(&name).or_else(|| self.handler.example(&name)) {
            Some(example) => {
                say(context, &example.summary);
                self.prefill = Some(example.template);
            }
            None => say(context, &format!("No example available for {name}")),
        }
    }
}

fn help(context: &mut Context) {
    for line in ABOUT {
        say(context, line);
    }
    for (usage, what) in BUILTINS.iter().chain(KEYS) {
        say(context, &format!("{usage:>22} - {what}"));
    }
}

fn list_history(context: &mut Context) {
    let lines: Vec<String> = context
        .history()
        .entries()
        .iter()
        .map(|e| format!("{:>5} {}", e.times_recalled, e.text))
        .collect();
    if lines.is_empty() {
        say(context, "Nothing remembered yet");
    }
    for line in lines {
        say(context, &line);
    }
}

/// Subscribe and report the result.
pub fn subscribe(context: &mut Context, channel: &str) -> Flow {
    match context.stream_mut().subscribe(channel) {
        Ok(SubscribeOutcome::Sent) => say(context, &format!("Subscribed to {channel}")),
        Ok(SubscribeOutcome::AlreadySubscribed) => {
            say(context, &format!("Already subscribed to {channel}"));
        }
        Ok(SubscribeOutcome::Queued) => {
            say(context, &format!("Connecting to the stream for {channel}"));
        }
        Err(StreamError::MissingCredential) => return Flow::NeedToken(channel.to_string()),
        Err(StreamError::NotAuthenticated) => {
            say(context, "The stream is not authenticated yet; try again shortly");
        }
        Err(e) => say(context, &e.to_string()),
    }
    context.sync_layout();
    Flow::Continue
}

fn unsubscribe(context: &mut Context, channel: &str) {
    match context.stream_mut().unsubscribe(channel) {
        Ok(true) => say(context, &format!("Unsubscribed from {channel}")),
        Ok(false) => say(context, &format!("Not subscribed to {channel}")),
        Err(StreamError::NotAuthenticated) => {
            say(context, "The stream is not authenticated yet; try again shortly");
        }
        Err(e) => say(context, &e.to_string()),
    }
    context.sync_layout();
}

fn streams(context: &mut Context) -> Flow {
    let channels = context.stream().subscriptions().channels();
    let state = context.stream().state();
    if channels.is_empty() {
        say(context, "No subscriptions");
        return Flow::Continue;
    }
    say(context, &format!("Stream {state}: {}", channels.join(", ")));
    match context.stream_mut().resume() {
        Ok(true) => say(context, "Reconnecting to the stream"),
        Ok(false) => {}
        Err(StreamError::MissingCredential) => {
            if let Some(first) = channels.into_iter().next() {
                return Flow::NeedToken(first);
            }
        }
        Err(e) => say(context, &e.to_string()),
    }
    Flow::Continue
}

/// Build the context from the persisted session.
pub fn restore_session(config: &Config, tokens: &TokenStore) -> (Context, bool) {
    if let Err(e) = config.ensure_data_dir() {
        warn!(error = %e, "data directory unavailable; nothing will persist");
    }

    let mut output = OutputBuffer::new(config.output_capacity, config.line_width);
    let restored = load_session_log(&config.session_log_path(), config.output_capacity)
        .unwrap_or_else(|e| {
            warn!(error = %e, "session log not restored");
            Vec::new()
        });
    restore_into(&mut output, &restored);

    let history = load_history(&config.history_path(), config.history_capacity).unwrap_or_else(|e| {
        warn!(error = %e, "history not restored");
        HistoryStore::new(config.history_capacity)
    });

    let (tx, rx) = event_channel();
    let connector = WsConnector::new(
        config.stream.connect_timeout(),
        config.stream.socket_wait(),
    );
    let mut stream = StreamClient::new(Box::new(connector), &config.stream, tx);
    match tokens.load() {
        Ok(Some(token)) => stream.set_token(token),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "API token not read"),
    }
    let channels = load_subscriptions(&config.subscriptions_path()).unwrap_or_else(|e| {
        warn!(error = %e, "subscriptions not restored");
        Vec::new()
    });
    let restored_channels = stream.restore(channels);
    info!(
        lines = restored.len(),
        history = history.len(),
        subscriptions = restored_channels,
        "session restored"
    );

    let context = Context::new(config, output, history, stream, rx, std::time::Instant::now());
    (context, !restored.is_empty())
}

/// Write history, subscriptions and the session log.
pub fn persist_session(config: &Config, context: &Context) {
    if let Err(e) = save_history(&config.history_path(), context.history()) {
        warn!(error = %e, "history not saved");
    }
    let channels = context.stream().subscriptions().channels();
    if let Err(e) = save_subscriptions(&config.subscriptions_path(), &channels) {
        warn!(error = %e, "subscriptions not saved");
    }
    if let Err(e) = save_session_log(&config.session_log_path(), context.output()) {
        warn!(error = %e, "session log not saved");
    }
}

/// Run an interactive session until the user exits or SIGINT arrives.
pub fn run(config: &Config, handler: Box<dyn CommandHandler>) -> Result<()> {
    let tokens = TokenStore::new(config.secrets_dir());
    let (context, had_session) = restore_session(config, &tokens);
    let mut compositor = Compositor::new(context, config.input.key_poll())?;
    let mut shell = Shell::new(handler);
    let mut token_prompted = false;

    {
        let context = compositor.context_mut();
        if !had_session {
            for line in ABOUT {
                say(context, line);
            }
        }
        context.print(&time_banner("New session started at ", Local::now()));
        context.print(READING_CUE);
    }

    loop {
        let initial = shell.take_prefill().unwrap_or_default();
        let line = match compositor.read_line_with(&config.prompt, Capabilities::COMMAND, &initial)? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Cancelled | ReadOutcome::Key(_) => continue,
            ReadOutcome::Interrupted => break,
        };

        let mut flow = shell.dispatch(compositor.context_mut(), &line, Local::now());
        while let Flow::NeedToken(channel) = flow {
            flow = Flow::Continue;
            if token_prompted {
                say(compositor.context_mut(), "No API token for the stream");
                break;
            }
            token_prompted = true;
            let token = match compositor.read_line(TOKEN_PROMPT, Capabilities::EDIT | Capabilities::HIDDEN)? {
                ReadOutcome::Line(token) if !token.trim().is_empty() => token,
                ReadOutcome::Interrupted => break,
                _ => {
                    say(compositor.context_mut(), "No API token for the stream");
                    break;
                }
            };
            if let Err(e) = tokens.save(&token) {
                warn!(error = %e, "API token not saved");
                say(compositor.context_mut(), "The token is kept for this session only");
            }
            let context = compositor.context_mut();
            context.stream_mut().set_token(token);
            flow = subscribe(context, &channel);
        }
        if flow == Flow::Exit || compositor.stop_requested() {
            break;
        }
    }

    let mut context = compositor.finish()?;
    context.print(&time_banner("Session stopped at ", Local::now()));
    persist_session(config, &context);
    info!("session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Connector, Transport};
    use chrono::TimeZone;
    use std::time::Instant;

    struct Offline;

    impl Connector for Offline {
        fn connect(&mut self, url: &str) -> std::result::Result<Box<dyn Transport>, StreamError> {
            Err(StreamError::Transport(format!("{url} unreachable")))
        }
    }

    struct Pricing;

    impl CommandHandler for Pricing {
        fn handle(&mut self, line: &str) -> Reply {
            Reply {
                lines: vec![format!("priced {line}")],
                prefill: None,
            }
        }

        fn example(&self, name: &str) -> Option<Example> {
            (name == "eo").then(|| Example::new("A European call:", "eo T:C,S:16,K:15"))
        }
    }

    fn context() -> Context {
        let config = Config::default().with_data_dir("/tmp/unused");
        let (tx, rx) = event_channel();
        let stream = StreamClient::new(Box::new(Offline), &config.stream, tx);
        let mut context = Context::new(
            &config,
            OutputBuffer::new(100, 120),
            HistoryStore::new(50),
            stream,
            rx,
            Instant::now(),
        );
        context.resize(120, 20);
        context
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 19, 9, 14, 2).unwrap()
    }

    fn last_line(context: &Context) -> String {
        context.output().lines().last().unwrap_or_default().to_string()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("q"), Command::Exit);
        assert_eq!(Command::parse("QUIT"), Command::Exit);
        assert_eq!(Command::parse("echo  hi there "), Command::Echo("hi there".into()));
        assert_eq!(Command::parse("sub spy"), Command::Subscribe("spy".into()));
        assert_eq!(Command::parse("ex eo"), Command::Example("eo".into()));
        assert_eq!(Command::parse("commands"), Command::History);
        assert_eq!(
            Command::parse("eo T:C,S:16"),
            Command::External("eo T:C,S:16".into())
        );
    }

    #[test]
    fn test_normalize_channel() {
        assert_eq!(normalize_channel("spy"), "AM.SPY");
        assert_eq!(normalize_channel("A.x"), "A.X");
    }

    #[test]
    fn test_remembers_everything_but_exit() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Unrecognized));
        assert_eq!(shell.dispatch(&mut ctx, "echo hi", now()), Flow::Continue);
        assert_eq!(shell.dispatch(&mut ctx, "nonsense", now()), Flow::Continue);
        assert_eq!(shell.dispatch(&mut ctx, "   ", now()), Flow::Continue);
        assert_eq!(shell.dispatch(&mut ctx, "exit", now()), Flow::Exit);

        let texts: Vec<_> = ctx.history().entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["echo hi", "nonsense"]);
    }

    #[test]
    fn test_echo_and_unrecognized() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Unrecognized));
        shell.dispatch(&mut ctx, "echo hello", now());
        assert_eq!(last_line(&ctx), ":  hello");
        shell.dispatch(&mut ctx, "frobnicate", now());
        assert_eq!(last_line(&ctx), ":  Unrecognized command");
    }

    #[test]
    fn test_external_handler() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Pricing));
        shell.dispatch(&mut ctx, "eo T:C", now());
        assert_eq!(last_line(&ctx), ":  priced eo T:C");
    }

    #[test]
    fn test_time_banner() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Unrecognized));
        shell.dispatch(&mut ctx, "time", now());
        assert!(last_line(&ctx).starts_with(":  09:14:02 am on 19 Oct 2026 (computer reports "));
    }

    #[test]
    fn test_example_prefills_editor() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Pricing));
        shell.dispatch(&mut ctx, "example eo", now());
        assert_eq!(last_line(&ctx), ":  A European call:");
        assert_eq!(shell.take_prefill().as_deref(), Some("eo T:C,S:16,K:15"));
        assert_eq!(shell.take_prefill(), None);

        shell.dispatch(&mut ctx, "ex subscribe", now());
        assert_eq!(shell.take_prefill().as_deref(), Some("subscribe SPY"));

        shell.dispatch(&mut ctx, "ex nothing", now());
        assert_eq!(last_line(&ctx), ":  No example available for nothing");
    }

    #[test]
    fn test_history_listing() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Unrecognized));
        shell.dispatch(&mut ctx, "echo a", now());
        shell.dispatch(&mut ctx, "echo a", now());
        shell.dispatch(&mut ctx, "commands", now());
        let lines: Vec<_> = ctx.output().lines().rev().take(2).collect();
        assert_eq!(lines, vec![":      1 commands", ":      2 echo a"]);
    }

    #[test]
    fn test_subscribe_without_token_asks_for_one() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Unrecognized));
        assert_eq!(
            shell.dispatch(&mut ctx, "subscribe spy", now()),
            Flow::NeedToken("AM.SPY".into())
        );
    }

    #[test]
    fn test_subscribe_reports_connect_failure() {
        let mut ctx = context();
        ctx.stream_mut().set_token("k");
        let mut shell = Shell::new(Box::new(Unrecognized));
        assert_eq!(shell.dispatch(&mut ctx, "subscribe spy", now()), Flow::Continue);
        assert!(ctx
            .output()
            .lines()
            .any(|l| l.starts_with(":  could not connect to wss://socket.polygon.io/stocks")));
        assert!(ctx.stream().subscriptions().is_empty());
    }

    #[test]
    fn test_unsubscribe_requires_authentication() {
        let mut ctx = context();
        let mut shell = Shell::new(Box::new(Unrecognized));
        shell.dispatch(&mut ctx, "unsubscribe spy", now());
        assert_eq!(
            last_line(&ctx),
            ":  The stream is not authenticated yet; try again shortly"
        );
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_data_dir(dir.path());
        let tokens = TokenStore::new(config.secrets_dir());

        let (mut ctx, had_session) = restore_session(&config, &tokens);
        assert!(!had_session);
        let mut shell = Shell::new(Box::new(Unrecognized));
        shell.dispatch(&mut ctx, "echo persisted", now());
        ctx.stream_mut().restore(["AM.SPY"]);
        persist_session(&config, &ctx);

        let (ctx, had_session) = restore_session(&config, &tokens);
        assert!(had_session);
        assert_eq!(ctx.output().lines().last(), Some(":  persisted"));
        assert_eq!(ctx.history().entries()[0].text, "echo persisted");
        assert_eq!(ctx.stream().subscriptions().channels(), vec!["AM.SPY".to_string()]);
    }
}
