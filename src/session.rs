//! Session
//!
//! One interactive shell: the virtual filesystem, command history, the
//! display buffer and any `curl` requests still in flight. Commands run
//! synchronously; `curl` output is appended whenever its response lands.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::commands::curl::{self, CurlRequest, NETWORK_UNAVAILABLE};
use crate::commands::{CommandInterpreter, CommandResult, SessionAction};
use crate::config::SessionOptions;
use crate::fs::VirtualFs;
use crate::history::History;
use crate::network::FetchFn;
use crate::output::{OutputBuffer, OutputEvent};
use crate::sandbox::SandboxRunner;

pub struct Session {
    fs: VirtualFs,
    history: History,
    output: Arc<Mutex<OutputBuffer>>,
    interpreter: CommandInterpreter,
    fetch_fn: Option<FetchFn>,
    pending: Vec<JoinHandle<()>>,
}

fn lock(output: &Mutex<OutputBuffer>) -> MutexGuard<'_, OutputBuffer> {
    output.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    /// Create a session without network access.
    pub fn new(options: SessionOptions) -> Self {
        let fs = if options.seed { VirtualFs::seeded() } else { VirtualFs::new() };
        info!(
            "session: seed={} max_lines={} limits={:?}",
            options.seed, options.max_lines, options.sandbox
        );
        Self {
            fs,
            history: History::new(),
            output: Arc::new(Mutex::new(OutputBuffer::new(options.max_lines))),
            interpreter: CommandInterpreter::new(SandboxRunner::new(options.sandbox)),
            fetch_fn: None,
            pending: Vec::new(),
        }
    }

    /// Create a session whose `curl` goes through `fetch_fn`.
    pub fn with_fetch(options: SessionOptions, fetch_fn: FetchFn) -> Self {
        let mut session = Self::new(options);
        session.fetch_fn = Some(fetch_fn);
        session
    }

    /// Record `line` in history, then run it.
    pub fn submit(&mut self, line: &str) -> Vec<CommandResult> {
        self.history.record(line);
        self.execute(line)
    }

    /// Run every sub-command of `line`, echoing each to the display first.
    pub fn execute(&mut self, line: &str) -> Vec<CommandResult> {
        let executed = self.interpreter.execute_line(line, &mut self.fs);
        let mut results = Vec::with_capacity(executed.len());

        for entry in executed {
            {
                let mut output = lock(&self.output);
                output.push_prompt(&entry.input);
                if let Some(text) = entry.result.output() {
                    output.push_output(text);
                }
            }
            match &entry.result.action {
                Some(SessionAction::ClearScreen) => lock(&self.output).clear(),
                Some(SessionAction::Fetch(request)) => self.start_fetch(request.clone()),
                None => {}
            }
            results.push(entry.result);
        }
        results
    }

    /// Wait for every in-flight `curl` to append its output.
    pub async fn settle(&mut self) {
        for handle in std::mem::take(&mut self.pending) {
            if let Err(err) = handle.await {
                warn!("session: curl task failed: {}", err);
            }
        }
    }

    /// The retained display, newline-joined.
    pub fn render(&self) -> String {
        lock(&self.output).render()
    }

    pub fn take_events(&self) -> Vec<OutputEvent> {
        lock(&self.output).take_events()
    }

    pub fn fs(&self) -> &VirtualFs {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut VirtualFs {
        &mut self.fs
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn cwd(&self) -> &str {
        self.fs.current_dir()
    }

    fn start_fetch(&mut self, request: CurlRequest) {
        let Some(fetch_fn) = self.fetch_fn.clone() else {
            lock(&self.output).push_output(NETWORK_UNAVAILABLE);
            return;
        };
        let output = Arc::clone(&self.output);
        let task = async move {
            let text = curl::perform(request, Some(fetch_fn)).await;
            lock(&output).push_output(&text);
        };

        match Handle::try_current() {
            Ok(handle) => self.pending.push(handle.spawn(task)),
            Err(_) => {
                // no ambient runtime: finish the request before returning
                match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime.block_on(task),
                    Err(err) => {
                        warn!("session: cannot start runtime for curl: {}", err);
                        lock(&self.output).push_output(&format!("curl: {}", err));
                    }
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{FetchFuture, FetchResponse, NetworkError};
    use std::collections::HashMap;
    use std::time::Duration;

    fn echo_fetch(delay_ms: u64) -> FetchFn {
        Arc::new(move |url: String, method: String, _headers: HashMap<String, String>, body: Option<String>| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                if url.ends_with("/missing") {
                    return Ok(FetchResponse {
                        status: 404,
                        status_text: "Not Found".to_string(),
                        headers: HashMap::new(),
                        body: String::new(),
                        url,
                    });
                }
                if url.starts_with("https://down.") {
                    return Err(NetworkError::Transport { message: "Failed to fetch".to_string() });
                }
                Ok(FetchResponse {
                    status: 200,
                    status_text: "OK".to_string(),
                    headers: HashMap::new(),
                    body: format!("{} {}{}", method, url, body.map(|b| format!(" {}", b)).unwrap_or_default()),
                    url,
                })
            }) as FetchFuture
        })
    }

    #[test]
    fn test_prompt_echo_and_output() {
        let mut session = Session::default();
        session.submit("pwd; cat /hello_world.txt");
        assert_eq!(session.render(), "> pwd\n/\n> cat /hello_world.txt\nhi");
        assert_eq!(session.history().entries(), &["pwd; cat /hello_world.txt".to_string()]);
    }

    #[test]
    fn test_execute_returns_results_in_order() {
        let mut session = Session::default();
        let results = session.execute("mkdir /a; mkdir /a; cd /a");
        assert_eq!(results.len(), 3);
        assert!(!results[0].is_error());
        assert_eq!(results[1].stderr, "mkdir: cannot create directory ‘/a’: File exists");
        assert_eq!(session.cwd(), "/a");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_clear_wipes_display() {
        let mut session = Session::default();
        session.submit("ls");
        session.take_events();
        session.submit("clear; pwd");
        assert_eq!(session.render(), "> pwd\n/");
        assert_eq!(session.take_events().first(), Some(&OutputEvent::Clear));
    }

    #[test]
    fn test_unseeded_session() {
        let options = SessionOptions { seed: false, ..SessionOptions::default() };
        let mut session = Session::new(options);
        assert!(session.fs().list_directory("/").unwrap().is_empty());
        session.submit("cat /hello_world.txt");
        assert!(session.render().ends_with("cat: /hello_world.txt: No such file or directory"));
    }

    #[test]
    fn test_display_is_capped() {
        let options = SessionOptions { max_lines: 4, ..SessionOptions::default() };
        let mut session = Session::new(options);
        session.submit("pwd; pwd; pwd");
        assert_eq!(session.render(), "> pwd\n/\n> pwd\n/");
    }

    #[test]
    fn test_script_output_is_capped_per_line() {
        let mut session = Session::default();
        session
            .fs_mut()
            .write_file("/many.js", "for (let i = 0; i < 300; i++) console.log('line ' + i)")
            .unwrap();
        session.submit("./many.js");
        let render = session.render();
        let lines: Vec<&str> = render.lines().collect();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], "<span style=\"color: #33FF33;\">line 200</span><br>");
        assert_eq!(lines[99], "<span style=\"color: #33FF33;\">line 299</span><br>");
    }

    #[test]
    fn test_man_page_lines_count_toward_cap() {
        let options = SessionOptions { max_lines: 3, ..SessionOptions::default() };
        let mut session = Session::new(options);
        session.submit("man curl");
        let render = session.render();
        assert_eq!(render.lines().count(), 3);
        assert!(!render.contains("> man curl"));
    }

    #[test]
    fn test_curl_without_network() {
        let mut session = Session::default();
        session.submit("curl https://example.com");
        assert_eq!(session.render(), format!("> curl https://example.com\n{}", NETWORK_UNAVAILABLE));
    }

    #[test]
    fn test_curl_without_runtime_blocks() {
        let mut session = Session::with_fetch(SessionOptions::default(), echo_fetch(0));
        session.submit("curl https://example.com");
        assert_eq!(session.render(), "> curl https://example.com\nGET https://example.com");
    }

    #[tokio::test]
    async fn test_curl_output_arrives_after_settle() {
        let mut session = Session::with_fetch(SessionOptions::default(), echo_fetch(50));
        session.submit("curl https://example.com; pwd");
        assert_eq!(session.render(), "> curl https://example.com\n> pwd\n/");

        session.settle().await;
        assert_eq!(session.render(), "> curl https://example.com\n> pwd\n/\nGET https://example.com");
    }

    #[tokio::test]
    async fn test_curl_errors_are_appended() {
        let mut session = Session::with_fetch(SessionOptions::default(), echo_fetch(0));
        session.submit("curl https://example.com/missing");
        session.settle().await;
        session.submit("curl https://down.example.com");
        session.settle().await;
        assert_eq!(
            session.render(),
            "> curl https://example.com/missing\ncurl: HTTP error! status: 404\n\
             > curl https://down.example.com\ncurl: Failed to fetch"
        );
    }

    #[tokio::test]
    async fn test_curl_usage_error_is_synchronous() {
        let mut session = Session::with_fetch(SessionOptions::default(), echo_fetch(0));
        session.submit("curl -i");
        assert_eq!(session.render(), "> curl -i\ncurl: missing URL");
        session.settle().await;
        assert_eq!(session.render(), "> curl -i\ncurl: missing URL");
    }

    #[test]
    fn test_script_writes_are_visible_to_shell() {
        let mut session = Session::default();
        session.fs_mut().write_file("/gen.js", "require('fs').writeFileSync('out.txt', 'generated')").unwrap();
        session.submit("./gen.js; cat out.txt");
        assert!(session.render().ends_with("> cat out.txt\ngenerated"));
    }

    #[test]
    fn test_history_navigation_through_session() {
        let mut session = Session::default();
        session.submit("ls");
        session.submit("pwd");
        assert_eq!(session.history_mut().previous(), Some("pwd"));
        assert_eq!(session.history_mut().previous(), Some("ls"));
    }
}
