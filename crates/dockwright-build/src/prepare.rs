use dockwright_core::{BuildDescriptor, Instruction};

/// Default per-target dependency install invocation.
pub const DEFAULT_INSTALL_COMMAND: &[&str] = &["composer", "install", "--no-interaction", "--no-dev"];

/// Where the credential file lands inside the image during installs.
const IMAGE_AUTH_PATH: &str = "/root/.dockwright/auth.json";

/// Injects the operational instructions an image needs before its manifest
/// is rendered: git protocol rewrite, access token, credential file, one
/// dependency install per target, credential cleanup.
///
/// The pipeline runs this exactly once per image, immediately before
/// [`BuildDescriptor::to_manifest`].
#[derive(Debug, Clone)]
pub struct Preparer {
    /// OAuth token configured inside the image for the install step.
    pub token: Option<String>,
    /// Program and arguments of the dependency install command; the target
    /// directory is appended as `--working-dir=<target>`.
    pub install_command: Vec<String>,
    /// Append the installer's verbose flag (debug mode).
    pub verbose: bool,
}

impl Default for Preparer {
    fn default() -> Self {
        Self {
            token: None,
            install_command: DEFAULT_INSTALL_COMMAND
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            verbose: false,
        }
    }
}

impl Preparer {
    pub fn prepare(&self, descriptor: &mut BuildDescriptor) {
        // Anonymous git:// clones are dead on the major hosts.
        descriptor.append_instruction(Instruction::Run(tokens([
            "git",
            "config",
            "--global",
            "url.https://github.com/.insteadOf",
            "git://github.com/",
        ])));

        match &self.token {
            Some(token) => {
                descriptor.append_instruction(Instruction::Run(vec![
                    "git".to_owned(),
                    "config".to_owned(),
                    "--global".to_owned(),
                    "github.accesstoken".to_owned(),
                    token.clone(),
                ]));
            }
            None => tracing::debug!(image = %descriptor.key(), "no access token found"),
        }

        let targets = descriptor.install_targets().to_vec();
        if targets.is_empty() {
            return;
        }

        // The token raises the API rate limit during installs; the file and
        // the global git config are stripped out again below.
        descriptor.append_instruction(Instruction::Add {
            src: "auth.json".to_owned(),
            dest: IMAGE_AUTH_PATH.to_owned(),
        });

        for target in &targets {
            let mut command = self.install_command.clone();
            if self.verbose {
                command.push("-vvv".to_owned());
            }
            command.push(format!("--working-dir={target}"));
            descriptor.append_instruction(Instruction::Run(command));
        }

        descriptor.append_instruction(Instruction::Run(tokens([
            "rm",
            "-rf",
            "/root/.dockwright",
            "/root/.gitconfig",
        ])));
    }
}

fn tokens<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_owned()).collect()
}
