use super::*;

pub(crate) struct CommandBuilder {
    args: Vec<String>,
    env: BTreeMap<String, String>,
    expected_exit_code: i32,
    tempdir: Arc<TempDir>,
}

impl CommandBuilder {
    pub(crate) fn new(args: impl ToArgs) -> Self {
        Self {
            args: args.to_args(),
            env: BTreeMap::new(),
            expected_exit_code: 0,
            tempdir: Arc::new(TempDir::new().unwrap()),
        }
    }

    pub(crate) fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub(crate) fn expected_exit_code(self, expected_exit_code: i32) -> Self {
        Self {
            expected_exit_code,
            ..self
        }
    }

    /// Writes `contents` to `path` inside the command's working directory.
    pub(crate) fn write(self, path: impl AsRef<Path>, contents: &str) -> Self {
        fs::write(self.tempdir.path().join(path), contents).unwrap();
        self
    }

    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_coinminer"));

        for (key, _) in std::env::vars() {
            if key.starts_with("COINMINER_") {
                command.env_remove(key);
            }
        }

        command
            .envs(&self.env)
            .env("XDG_CONFIG_HOME", self.tempdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .current_dir(&*self.tempdir)
            .args(&self.args);

        command
    }

    #[track_caller]
    pub(crate) fn run(self) -> Output {
        let output = self.command().output().unwrap();

        assert_eq!(
            output.status.code(),
            Some(self.expected_exit_code),
            "unexpected exit status, stderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );

        output
    }

    #[track_caller]
    pub(crate) fn run_and_extract_stderr(self) -> String {
        String::from_utf8(self.run().stderr).unwrap()
    }

    #[track_caller]
    pub(crate) fn run_and_deserialize_output<T: DeserializeOwned>(self) -> T {
        let output = self.run();
        serde_json::from_slice(&output.stdout).unwrap()
    }
}
