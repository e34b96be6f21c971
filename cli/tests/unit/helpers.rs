//! Shared test doubles: in-memory fakes for every port and output constructors.

#![allow(dead_code, clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use gpu_bootstrap::application::ports::{
    CommandRunner, DeviceQuery, HostInfo, LocalFs, ProcessSupervisor, ProfileStore,
    ProgressReporter, Prompter, RegistryClient, WalletStore,
};
use gpu_bootstrap::domain::credentials::{ProfileScan, format_export, parse_export, parse_profile};
use gpu_bootstrap::domain::identity::RegistryTarget;
use gpu_bootstrap::domain::launch::LaunchPlan;
use gpu_bootstrap::domain::supervisor::{ProcessStatus, SupervisedProcess};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── FakeHost ─────────────────────────────────────────────────────────────────

pub const CWD: &str = "/home/miner";
pub const CHECKOUT: &str = "/home/miner/templar";

pub const UBUNTU_RELEASE: &str = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";

/// A simulated host. Installed tools answer `--version`; install commands
/// add tools and files the way the real package managers would.
pub struct FakeHost {
    pub os_family: String,
    pub os_release: Option<String>,
    pub root: bool,
    pub cwd: PathBuf,
    tools: RefCell<HashMap<String, String>>,
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    calls: RefCell<Vec<String>>,
    /// Command lines containing any of these substrings exit with status 1.
    failing: RefCell<Vec<String>>,
}

impl FakeHost {
    /// An Ubuntu host with nothing installed.
    pub fn bare_ubuntu() -> Self {
        Self {
            os_family: "linux".to_string(),
            os_release: Some(UBUNTU_RELEASE.to_string()),
            root: false,
            cwd: PathBuf::from(CWD),
            tools: RefCell::new(HashMap::new()),
            files: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
            failing: RefCell::new(Vec::new()),
        }
    }

    /// An Ubuntu host where every tool is present at a compatible version.
    pub fn provisioned_ubuntu() -> Self {
        let host = Self::bare_ubuntu();
        for (tool, version) in [
            ("git", "git version 2.43.0"),
            ("node", "v20.11.1"),
            ("npm", "10.2.4"),
            ("pm2", "5.3.1"),
            ("python3.12", "Python 3.12.3"),
        ] {
            host.add_tool(tool, version);
        }
        host
    }

    #[must_use]
    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    #[must_use]
    pub fn with_os_release(mut self, content: &str) -> Self {
        self.os_release = Some(content.to_string());
        self
    }

    pub fn add_tool(&self, name: &str, version: &str) {
        self.tools
            .borrow_mut()
            .insert(name.to_string(), version.to_string());
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, content: &[u8]) {
        self.files.borrow_mut().insert(path.into(), content.to_vec());
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn fail_when(&self, fragment: &str) {
        self.failing.borrow_mut().push(fragment.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls that are not `--version` probes.
    pub fn side_effect_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.ends_with(" --version"))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn handle(&self, program: &str, args: &[&str]) -> Result<Output> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(line.clone());

        if self.failing.borrow().iter().any(|f| line.contains(f.as_str())) {
            return Ok(err_output(1, b"E: simulated failure"));
        }

        let (program, args) = match (program, args) {
            ("sudo", [inner, rest @ ..]) => (*inner, rest),
            _ => (program, args),
        };

        if args == ["--version"] {
            return match self.tools.borrow().get(program) {
                Some(version) => Ok(ok_output(version.as_bytes())),
                None => anyhow::bail!("failed to spawn {program}"),
            };
        }

        match (program, args) {
            ("apt-get", ["install", "-y", pkgs @ ..]) => {
                for pkg in pkgs {
                    match *pkg {
                        "git" => self.add_tool("git", "git version 2.43.0"),
                        "nodejs" => self.add_tool("node", "v18.19.1"),
                        "npm" => self.add_tool("npm", "9.2.0"),
                        "python3.12" => self.add_tool("python3.12", "Python 3.12.3"),
                        _ => {}
                    }
                }
            }
            ("npm", ["install", "-g", "pm2"]) => self.add_tool("pm2", "5.3.1"),
            ("git", ["clone", _url, target]) => {
                let target = PathBuf::from(target);
                self.add_file(target.join(".git"), b"");
                self.add_file(target.join("neurons/miner.py"), b"# worker");
                self.add_file(target.join("requirements.txt"), b"bittensor\ntorch\n");
            }
            (_, ["-m", "venv", venv]) => {
                self.add_file(PathBuf::from(venv).join("bin/python"), b"");
            }
            _ => {}
        }
        Ok(ok_output(b""))
    }
}

impl CommandRunner for FakeHost {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.handle(program, args)
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        self.handle(program, args)
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        _envs: &[(&str, &str)],
    ) -> Result<Output> {
        self.handle(program, args)
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        Ok(self.handle(program, args)?.status)
    }
}

impl HostInfo for FakeHost {
    fn os_family(&self) -> &str {
        &self.os_family
    }

    fn os_release(&self) -> Option<String> {
        self.os_release.clone()
    }

    fn is_root(&self) -> bool {
        self.root
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }
}

impl LocalFs for FakeHost {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.file(path)
            .ok_or_else(|| anyhow::anyhow!("{} not found", path.display()))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.add_file(path, content);
        Ok(())
    }
}

// ── RecordingRunner ──────────────────────────────────────────────────────────

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub inherited_stdio: bool,
}

/// Records every call and answers with queued outputs (success by default).
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Call>>,
    responses: RefCell<VecDeque<Output>>,
}

impl RecordingRunner {
    pub fn respond(&self, output: Output) {
        self.responses.borrow_mut().push_back(output);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
        timeout: Option<Duration>,
        inherited_stdio: bool,
    ) -> Output {
        self.calls.borrow_mut().push(Call {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            envs: envs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            timeout,
            inherited_stdio,
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| ok_output(b""))
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Ok(self.record(program, args, &[], None, false))
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        Ok(self.record(program, args, &[], Some(timeout), false))
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output> {
        Ok(self.record(program, args, envs, None, false))
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        Ok(self.record(program, args, &[], None, true).status)
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Step,
    Success,
    Warn,
}

#[derive(Default)]
pub struct RecordingReporter {
    lines: RefCell<Vec<(Level, String)>>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.lines.borrow_mut().push((Level::Step, message.to_string()));
    }

    fn success(&self, message: &str) {
        self.lines
            .borrow_mut()
            .push((Level::Success, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push((Level::Warn, message.to_string()));
    }
}

// ── Profile and prompts ──────────────────────────────────────────────────────

/// Append-only in-memory profile holding raw shell text.
#[derive(Default)]
pub struct MemoryProfile {
    content: RefCell<String>,
    pub appends: Cell<usize>,
}

impl MemoryProfile {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        let profile = Self::default();
        for (k, v) in entries {
            profile.push_line(&format_export(k, v));
        }
        profile
    }

    /// A profile with hand-written content, e.g. commented exports.
    pub fn raw(content: &str) -> Self {
        let profile = Self::default();
        profile.content.borrow_mut().push_str(content);
        profile
    }

    fn push_line(&self, line: &str) {
        let mut content = self.content.borrow_mut();
        content.push_str(line);
        content.push('\n');
    }

    /// Every readable `export` line, in file order.
    pub fn lines(&self) -> Vec<(String, String)> {
        self.content.borrow().lines().filter_map(parse_export).collect()
    }
}

impl ProfileStore for MemoryProfile {
    fn read_entries(&self) -> Result<ProfileScan> {
        Ok(parse_profile(&self.content.borrow()))
    }

    fn append(&self, entries: &[(String, String)]) -> Result<()> {
        self.appends.set(self.appends.get() + 1);
        for (k, v) in entries {
            self.push_line(&format_export(k, v));
        }
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("/home/miner/.bashrc")
    }
}

/// Answers prompts from a script; panics on unexpected questions.
pub struct ScriptedPrompter {
    pub interactive: bool,
    pub accept: bool,
    answers: RefCell<VecDeque<String>>,
    pub asked: RefCell<Vec<(String, bool)>>,
    pub confirmations: Cell<usize>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            interactive: true,
            accept: true,
            answers: RefCell::new(answers.iter().map(|a| (*a).to_string()).collect()),
            asked: RefCell::new(Vec::new()),
            confirmations: Cell::new(0),
        }
    }

    pub fn declining() -> Self {
        Self {
            accept: false,
            ..Self::answering(&[])
        }
    }

    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::answering(&[])
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&self, _prompt: &str) -> Result<bool> {
        self.confirmations.set(self.confirmations.get() + 1);
        Ok(self.accept)
    }

    fn input(&self, prompt: &str, secret: bool) -> Result<String> {
        self.asked.borrow_mut().push((prompt.to_string(), secret));
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {prompt}"))
    }
}

// ── Hardware ─────────────────────────────────────────────────────────────────

pub struct FakeDevices {
    report: Option<String>,
}

impl FakeDevices {
    pub fn report(report: &str) -> Self {
        Self {
            report: Some(report.to_string()),
        }
    }

    pub fn unavailable() -> Self {
        Self { report: None }
    }
}

impl DeviceQuery for FakeDevices {
    async fn memory_report(&self) -> Result<String> {
        self.report
            .clone()
            .ok_or_else(|| anyhow::anyhow!("failed to spawn nvidia-smi"))
    }
}

// ── Identities ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeWallets {
    primaries: RefCell<HashSet<String>>,
    hotkeys: RefCell<HashSet<(String, String)>>,
    pub created: RefCell<Vec<String>>,
    pub fail_creation: bool,
}

impl FakeWallets {
    pub fn failing() -> Self {
        Self {
            fail_creation: true,
            ..Self::default()
        }
    }

    pub fn hotkey_count(&self) -> usize {
        self.hotkeys.borrow().len()
    }

    pub fn has_hotkey(&self, wallet: &str, hotkey: &str) -> bool {
        self.hotkeys
            .borrow()
            .contains(&(wallet.to_string(), hotkey.to_string()))
    }
}

impl WalletStore for FakeWallets {
    async fn primary_exists(&self, wallet: &str) -> Result<bool> {
        Ok(self.primaries.borrow().contains(wallet))
    }

    async fn create_primary(&self, wallet: &str) -> Result<()> {
        anyhow::ensure!(!self.fail_creation, "btcli wallet new-coldkey failed");
        self.primaries.borrow_mut().insert(wallet.to_string());
        self.created.borrow_mut().push(wallet.to_string());
        Ok(())
    }

    async fn hotkey_exists(&self, wallet: &str, hotkey: &str) -> Result<bool> {
        Ok(self.has_hotkey(wallet, hotkey))
    }

    async fn create_hotkey(&self, wallet: &str, hotkey: &str) -> Result<()> {
        anyhow::ensure!(!self.fail_creation, "btcli wallet new-hotkey failed");
        self.hotkeys
            .borrow_mut()
            .insert((wallet.to_string(), hotkey.to_string()));
        self.created.borrow_mut().push(hotkey.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    registered: RefCell<HashSet<String>>,
    /// Hotkeys whose registration call fails.
    pub reject: HashSet<String>,
    /// Hotkeys whose status check fails.
    pub unreachable: HashSet<String>,
    pub register_calls: RefCell<Vec<String>>,
}

impl FakeRegistry {
    pub fn rejecting(hotkeys: &[&str]) -> Self {
        Self {
            reject: hotkeys.iter().map(|h| (*h).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unreachable(hotkeys: &[&str]) -> Self {
        Self {
            unreachable: hotkeys.iter().map(|h| (*h).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn is_registered_now(&self, hotkey: &str) -> bool {
        self.registered.borrow().contains(hotkey)
    }
}

impl RegistryClient for FakeRegistry {
    async fn is_registered(
        &self,
        _wallet: &str,
        hotkey: &str,
        _target: &RegistryTarget,
    ) -> Result<bool> {
        anyhow::ensure!(!self.unreachable.contains(hotkey), "subtensor unreachable");
        Ok(self.registered.borrow().contains(hotkey))
    }

    async fn register(&self, _wallet: &str, hotkey: &str, _target: &RegistryTarget) -> Result<()> {
        self.register_calls.borrow_mut().push(hotkey.to_string());
        anyhow::ensure!(!self.reject.contains(hotkey), "insufficient balance");
        self.registered.borrow_mut().insert(hotkey.to_string());
        Ok(())
    }
}

// ── Supervisor ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSupervisor {
    processes: RefCell<Vec<SupervisedProcess>>,
    pub log: RefCell<Vec<String>>,
}

impl FakeSupervisor {
    pub fn with(processes: &[(&str, ProcessStatus)]) -> Self {
        let sup = Self::default();
        sup.processes.borrow_mut().extend(processes.iter().map(|(name, status)| {
            SupervisedProcess {
                name: (*name).to_string(),
                status: status.clone(),
            }
        }));
        sup
    }

    pub fn processes(&self) -> Vec<SupervisedProcess> {
        self.processes.borrow().clone()
    }

    pub fn running_names(&self) -> Vec<String> {
        self.processes()
            .into_iter()
            .filter(SupervisedProcess::is_running)
            .map(|p| p.name)
            .collect()
    }
}

impl ProcessSupervisor for FakeSupervisor {
    async fn list(&self) -> Result<Vec<SupervisedProcess>> {
        Ok(self.processes())
    }

    async fn stop_all(&self) -> Result<()> {
        self.log.borrow_mut().push("stop all".to_string());
        for p in self.processes.borrow_mut().iter_mut() {
            p.status = ProcessStatus::Stopped;
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.log.borrow_mut().push("delete all".to_string());
        self.processes.borrow_mut().clear();
        Ok(())
    }

    async fn start(&self, plan: &LaunchPlan) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("start {}", plan.process_name));
        let mut processes = self.processes.borrow_mut();
        anyhow::ensure!(
            processes.iter().all(|p| p.name != plan.process_name),
            "{} already exists",
            plan.process_name
        );
        processes.push(SupervisedProcess {
            name: plan.process_name.clone(),
            status: ProcessStatus::Running,
        });
        Ok(())
    }
}
