//! Drives the built binary against a temporary install directory. Every scenario works offline:
//! JDKs are pre-seeded so nothing has to be downloaded.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["home", "config", "data", "jdks", "work"] {
            std::fs::create_dir(root.path().join(dir)).unwrap();
        }
        Sandbox { root }
    }

    fn path(&self, dir: &str) -> PathBuf {
        self.root.path().join(dir)
    }

    /// Creates a managed JDK with a `release` file and an empty `bin` directory.
    fn seed_jdk(&self, id: &str, java_version: &str) -> PathBuf {
        let home = self.path("jdks").join(id);
        std::fs::create_dir_all(home.join("bin")).unwrap();
        std::fs::write(
            home.join("release"),
            format!("IMPLEMENTOR=\"Test\"\nJAVA_VERSION=\"{}\"\n", java_version),
        )
        .unwrap();
        home
    }

    fn jvm(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_jvm"));
        command
            .current_dir(self.path("work"))
            .env("HOME", self.path("home"))
            .env("XDG_CONFIG_HOME", self.path("config"))
            .env("XDG_DATA_HOME", self.path("data"))
            .env("JVM_INSTALL_DIR", self.path("jdks"))
            .env_remove("JAVA_HOME")
            .env_remove("RUST_LOG");
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.jvm().args(args).output().expect("Failed to execute jvm")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_every_command() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--help"]);
    assert_eq!(Some(0), output.status.code());
    let help = stdout(&output);
    for command in [
        "list",
        "list-available",
        "list-providers",
        "install",
        "uninstall",
        "default",
        "link",
        "unlink",
        "env",
        "run",
    ] {
        assert!(help.contains(command), "missing {} in:\n{}", command, help);
    }
    assert!(help.contains("--quiet"));
}

#[test]
fn test_subcommand_help_has_no_side_effects() {
    let sandbox = Sandbox::new();
    sandbox.seed_jdk("17-temurin", "17.0.2");
    let output = sandbox.run(&["uninstall", "17", "--help"]);
    assert_eq!(Some(0), output.status.code());
    assert!(sandbox.path("jdks").join("17-temurin").exists());
}

#[test]
fn test_aliases() {
    let sandbox = Sandbox::new();
    for (alias, description) in [
        ("l", "List the installed Java versions"),
        ("a", "List the Java versions available for installation"),
        ("P", "List the available JDK providers"),
        ("i", "Install a Java JDK"),
        ("u", "Uninstall a Java JDK"),
        ("d", "Manage the default Java version"),
        ("L", "Link an existing Java installation"),
        ("U", "Unlink a previously linked Java installation"),
        ("e", "Print the required environment variables"),
        ("r", "Run a command making sure the correct Java version is used"),
    ] {
        let output = sandbox.run(&[alias, "--help"]);
        assert_eq!(Some(0), output.status.code(), "alias {}", alias);
        assert!(
            stdout(&output).contains(description),
            "alias {}: {}",
            alias,
            stdout(&output)
        );
    }
}

#[test]
fn test_invalid_version_is_a_usage_error() {
    let sandbox = Sandbox::new();
    for args in [
        &["install", "a b"][..],
        &["install", "abc,extra"][..],
        &["env", "-j", "+5"][..],
        &["run", "--java", "!x", "java"][..],
    ] {
        let output = sandbox.run(args);
        assert_eq!(Some(2), output.status.code(), "{:?}", args);
        assert!(stderr(&output).contains("Invalid version"), "{}", stderr(&output));
    }
}

#[test]
fn test_run_requires_a_command() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["run"]);
    assert_eq!(Some(2), output.status.code());
}

#[test]
fn test_reserved_commands_succeed() {
    let sandbox = Sandbox::new();
    for command in ["default", "link", "unlink", "d", "L", "U"] {
        let output = sandbox.run(&[command, "--quiet"]);
        assert_eq!(Some(0), output.status.code(), "{}", command);
    }
}

#[test]
fn test_uninstall_not_installed_reports_even_when_quiet() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["uninstall", "--quiet", "17"]);
    assert_eq!(Some(1), output.status.code());
    assert!(
        stderr(&output).contains("Java version not installed: 17"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn test_uninstall_removes_managed_jdk() {
    let sandbox = Sandbox::new();
    sandbox.seed_jdk("17-temurin", "17.0.2");
    let output = sandbox.run(&["u", "17"]);
    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Successfully uninstalled Java version 17+"));
    assert!(!sandbox.path("jdks").join("17-temurin").exists());
}

#[test]
fn test_install_already_installed() {
    let sandbox = Sandbox::new();
    sandbox.seed_jdk("17-temurin", "17.0.2");
    let output = sandbox.run(&["install", "17"]);
    assert_eq!(Some(1), output.status.code());
    let stderr = stderr(&output);
    assert!(stderr.contains("Java version is already installed: 17-temurin"), "{}", stderr);
    assert!(stderr.contains("Use --force to install anyway"), "{}", stderr);

    let quiet = sandbox.run(&["install", "--quiet", "17"]);
    assert_eq!(Some(1), quiet.status.code());
    assert!(self::stderr(&quiet).is_empty(), "{}", self::stderr(&quiet));
}

#[test]
fn test_list_installed() {
    let sandbox = Sandbox::new();
    sandbox.seed_jdk("17-temurin", "17.0.2");
    sandbox.seed_jdk("21-temurin", "21.0.1");
    let output = sandbox.run(&["list"]);
    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    let lines = stdout(&output).lines().map(str::to_string).collect::<Vec<_>>();
    assert!(lines[0].starts_with("V"), "{:?}", lines);
    assert!(lines[1].contains("21-temurin"), "{:?}", lines);
    assert!(lines[2].contains("17-temurin"), "{:?}", lines);
}

#[test]
fn test_list_providers() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["P"]);
    assert_eq!(Some(0), output.status.code());
    let stdout = stdout(&output);
    assert!(stdout.contains("Provider"));
    assert!(stdout.contains("jvm"));
    assert!(stdout.contains("javahome"));
}

#[cfg(unix)]
#[test]
fn test_env_prints_assignments() {
    let sandbox = Sandbox::new();
    let home = sandbox.seed_jdk("17-temurin", "17.0.2");
    let output = sandbox.run(&["env", "-j", "17"]);
    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    let stdout = stdout(&output);
    assert!(
        stdout.contains(&format!("export JAVA_HOME=\"{}\"", home.display())),
        "{}",
        stdout
    );
    assert!(
        stdout.contains(&format!("export PATH=\"{}:", home.join("bin").display())),
        "{}",
        stdout
    );
}

#[cfg(unix)]
#[test]
fn test_env_uses_jvmrc() {
    let sandbox = Sandbox::new();
    sandbox.seed_jdk("17-temurin", "17.0.2");
    let home_11 = sandbox.seed_jdk("11-temurin", "11.0.20");
    std::fs::write(sandbox.path("work").join(".jvmrc"), "java=11\n").unwrap();
    let output = sandbox.run(&["e"]);
    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    assert!(stdout(&output).contains(&format!("JAVA_HOME=\"{}\"", home_11.display())));
}

#[cfg(unix)]
#[test]
fn test_broken_jvmrc_falls_back_to_default() {
    let sandbox = Sandbox::new();
    let home_17 = sandbox.seed_jdk("17-temurin", "17.0.2");
    std::fs::write(sandbox.path("home").join(".jvmrc"), "java 11\n").unwrap();

    let output = sandbox.run(&["env"]);
    assert_eq!(Some(0), output.status.code(), "{}", stderr(&output));
    assert!(stderr(&output).contains("Error reading .jvmrc file"), "{}", stderr(&output));
    assert!(stdout(&output).contains(&format!("JAVA_HOME=\"{}\"", home_17.display())));

    let quiet = sandbox.run(&["env", "--quiet"]);
    assert_eq!(Some(0), quiet.status.code());
    assert!(!stderr(&quiet).contains("Error reading .jvmrc file"));
}

#[cfg(unix)]
fn write_script(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_run_tool_from_jdk() {
    let sandbox = Sandbox::new();
    let home = sandbox.seed_jdk("21-temurin", "21.0.1");
    sandbox.seed_jdk("17-temurin", "17.0.2");
    write_script(
        &home.join("bin").join("mytool"),
        "#!/bin/sh\n\
         [ \"$JAVA_HOME\" = \"$EXPECTED_HOME\" ] || exit 10\n\
         [ \"$1\" = \"--flag\" ] || exit 11\n\
         exit 5\n",
    );
    let output = sandbox
        .jvm()
        .env("EXPECTED_HOME", &home)
        .args(["run", "-j", "21", "--", "mytool", "--flag"])
        .output()
        .unwrap();
    assert_eq!(Some(5), output.status.code(), "{}", stderr(&output));

    let without_separator = sandbox
        .jvm()
        .env("EXPECTED_HOME", &home)
        .args(["r", "--java", "21", "mytool", "--flag"])
        .output()
        .unwrap();
    assert_eq!(Some(5), without_separator.status.code());
}
