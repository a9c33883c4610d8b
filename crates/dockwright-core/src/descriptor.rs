use std::path::Path;

use serde::{Deserialize, Serialize};

/// Strip the trailing `:tag` from an image reference, if any.
///
/// Only the last colon starts a tag, so registry ports survive:
/// `registry:5000/base:jammy` becomes `registry:5000/base`.
pub fn strip_tag(reference: &str) -> &str {
    match reference.rfind(':') {
        Some(idx) => &reference[..idx],
        None => reference,
    }
}

/// A single build-manifest instruction.
///
/// Serialized form in `build.toml` is one table per instruction, keyed by the
/// instruction kind:
///
/// ```toml
/// [[instructions]]
/// run = ["apt-get", "update"]
///
/// [[instructions]]
/// add = { src = "assets/app.conf", dest = "/etc/app.conf" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Instruction {
    /// Exec-form `RUN`, rendered as a JSON array.
    Run(Vec<String>),
    /// Shell-form `RUN`.
    Shell(String),
    Add { src: String, dest: String },
    Copy { src: String, dest: String },
    Env { name: String, value: String },
    Workdir(String),
    Expose(u16),
    /// Exec-form `CMD`.
    Cmd(Vec<String>),
}

impl Instruction {
    fn render(&self) -> String {
        match self {
            Instruction::Run(tokens) => format!("RUN {}", exec_form(tokens)),
            Instruction::Shell(command) => format!("RUN {command}"),
            Instruction::Add { src, dest } => format!("ADD {src} {dest}"),
            Instruction::Copy { src, dest } => format!("COPY {src} {dest}"),
            Instruction::Env { name, value } => format!("ENV {name}={value}"),
            Instruction::Workdir(dir) => format!("WORKDIR {dir}"),
            Instruction::Expose(port) => format!("EXPOSE {port}"),
            Instruction::Cmd(tokens) => format!("CMD {}", exec_form(tokens)),
        }
    }
}

fn exec_form(tokens: &[String]) -> String {
    serde_json::to_string(tokens).expect("a string slice always serializes to JSON")
}

/// On-disk shape of a `build.toml` descriptor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct DescriptorFile {
    from: String,
    #[serde(default)]
    assets: Vec<String>,
    #[serde(default)]
    projects: Vec<String>,
    #[serde(default)]
    install_targets: Vec<String>,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

/// One buildable image: identity, parent reference, and build content.
///
/// Identity (`key`, parent reference) is fixed at load time. The instruction
/// list is the one mutable part: the pipeline appends operational
/// instructions through [`append_instruction`](Self::append_instruction)
/// exactly once per image, immediately before [`to_manifest`](Self::to_manifest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    key: String,
    from: String,
    assets: Vec<String>,
    projects: Vec<String>,
    install_targets: Vec<String>,
    instructions: Vec<Instruction>,
}

impl BuildDescriptor {
    /// Parse a descriptor from TOML text.
    pub fn from_toml(key: impl Into<String>, text: &str) -> Result<Self, toml::de::Error> {
        let file: DescriptorFile = toml::from_str(text)?;
        Ok(Self {
            key: key.into(),
            from: file.from,
            assets: file.assets,
            projects: file.projects,
            install_targets: file.install_targets,
            instructions: file.instructions,
        })
    }

    /// Read and parse the descriptor entry point at `path`.
    pub fn from_path(key: impl Into<String>, path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| crate::Error::DescriptorRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(key, &text).map_err(|e| crate::Error::DescriptorParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Batch key: the descriptor directory relative to the images root.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parent image reference as written, tag included.
    pub fn parent_ref(&self) -> &str {
        &self.from
    }

    /// Parent reference with the tag stripped; this is what classification
    /// matches against batch keys.
    pub fn dependency_ref(&self) -> &str {
        strip_tag(&self.from)
    }

    /// Relative paths staged into the build context before building.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Source-repository URLs this image needs checked out.
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Directories inside the image that need a dependency install.
    pub fn install_targets(&self) -> &[String] {
        &self.install_targets
    }

    /// Append a build instruction. Mutates the descriptor and returns it for
    /// chaining; an explicit mutable-builder contract.
    pub fn append_instruction(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    /// Render the final build manifest: the `FROM` line followed by the
    /// flattened instruction list, one per line.
    pub fn to_manifest(&self) -> String {
        let mut manifest = format!("FROM {}\n", self.from);
        for instruction in &self.instructions {
            manifest.push_str(&instruction.render());
            manifest.push('\n');
        }
        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tag_removes_trailing_tag() {
        assert_eq!(strip_tag("ubuntu:22.04"), "ubuntu");
        assert_eq!(strip_tag("example/image1:latest"), "example/image1");
    }

    #[test]
    fn strip_tag_leaves_untagged_references() {
        assert_eq!(strip_tag("ubuntu"), "ubuntu");
        assert_eq!(strip_tag("example/image1"), "example/image1");
    }

    #[test]
    fn strip_tag_only_strips_the_last_colon() {
        assert_eq!(strip_tag("registry:5000/base:jammy"), "registry:5000/base");
        assert_eq!(strip_tag("registry:5000/base"), "registry:5000");
    }

    #[test]
    fn parses_minimal_descriptor() {
        let d = BuildDescriptor::from_toml("example/web", "from = \"ubuntu:22.04\"").unwrap();
        assert_eq!(d.key(), "example/web");
        assert_eq!(d.parent_ref(), "ubuntu:22.04");
        assert_eq!(d.dependency_ref(), "ubuntu");
        assert!(d.assets().is_empty());
        assert!(d.projects().is_empty());
        assert!(d.install_targets().is_empty());
    }

    #[test]
    fn parses_full_descriptor() {
        let text = r#"
from = "example/base:latest"
assets = ["conf", "bin/run.sh"]
projects = ["https://github.com/acme/site.git"]
install-targets = ["/srv/site"]

[[instructions]]
run = ["apt-get", "update"]

[[instructions]]
shell = "apt-get install -y nginx"

[[instructions]]
add = { src = "assets/nginx.conf", dest = "/etc/nginx/nginx.conf" }

[[instructions]]
env = { name = "APP_ENV", value = "production" }

[[instructions]]
workdir = "/srv/site"

[[instructions]]
expose = 8080

[[instructions]]
cmd = ["nginx", "-g", "daemon off;"]
"#;
        let d = BuildDescriptor::from_toml("example/web", text).unwrap();
        assert_eq!(d.dependency_ref(), "example/base");
        assert_eq!(d.assets(), ["conf", "bin/run.sh"]);
        assert_eq!(d.projects(), ["https://github.com/acme/site.git"]);
        assert_eq!(d.install_targets(), ["/srv/site"]);
        assert_eq!(
            d.to_manifest(),
            "FROM example/base:latest\n\
             RUN [\"apt-get\",\"update\"]\n\
             RUN apt-get install -y nginx\n\
             ADD assets/nginx.conf /etc/nginx/nginx.conf\n\
             ENV APP_ENV=production\n\
             WORKDIR /srv/site\n\
             EXPOSE 8080\n\
             CMD [\"nginx\",\"-g\",\"daemon off;\"]\n"
        );
    }

    #[test]
    fn missing_from_is_a_parse_error() {
        assert!(BuildDescriptor::from_toml("x", "assets = []").is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(BuildDescriptor::from_toml("x", "from = \"a\"\nfroom = \"b\"").is_err());
    }

    #[test]
    fn append_instruction_chains_and_preserves_order() {
        let mut d = BuildDescriptor::from_toml("x", "from = \"ubuntu\"").unwrap();
        d.append_instruction(Instruction::Shell("echo one".into()))
            .append_instruction(Instruction::Shell("echo two".into()));
        assert_eq!(d.to_manifest(), "FROM ubuntu\nRUN echo one\nRUN echo two\n");
    }

    #[test]
    fn exec_form_escapes_quotes() {
        let mut d = BuildDescriptor::from_toml("x", "from = \"ubuntu\"").unwrap();
        d.append_instruction(Instruction::Run(vec![
            "sh".into(),
            "-c".into(),
            "echo \"hi\"".into(),
        ]));
        assert_eq!(
            d.to_manifest(),
            "FROM ubuntu\nRUN [\"sh\",\"-c\",\"echo \\\"hi\\\"\"]\n"
        );
    }
}
