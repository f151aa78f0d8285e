//! Common test utilities for provenv integration tests
//!
//! Integration tests never touch the real package manager. Each test
//! environment carries a stub bin directory (apt-get, dpkg-query,
//! python3.11) that is prepended to PATH for the provenv process.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// The pip freeze output matching the standard test manifest pins
#[allow(dead_code)]
pub const GOOD_FREEZE: &str = "pip==23.3.1\\nsetuptools==65.5.0\\nwheel==0.41.2\\nlxml==4.9.4\\nfaiss-cpu==1.7.4\\n";

/// A throwaway host for provisioning tests
#[allow(dead_code)]
pub struct TestEnv {
    /// Temporary directory
    pub temp: TempDir,
    /// Root path of the test host
    pub path: PathBuf,
    /// Stub executables directory, prepended to PATH
    pub stub_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let stub_dir = path.join("stub-bin");
        fs::create_dir_all(&stub_dir).expect("Failed to create stub directory");
        Self {
            temp,
            path,
            stub_dir,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("provenv.yaml")
    }

    pub fn venv_path(&self) -> PathBuf {
        self.path.join("venv")
    }

    /// Write the standard two-package test manifest
    pub fn write_manifest(&self) {
        let yaml = format!(
            "name: test-env\n\
             python: \"3.11\"\n\
             venv: {}\n\
             os_packages:\n\
             \x20 toolchain:\n\
             \x20   - swig\n\
             \x20   - libxml2-dev\n\
             bootstrap:\n\
             \x20 - pip==23.3.1\n\
             \x20 - setuptools==65.5.0\n\
             \x20 - wheel==0.41.2\n\
             requirements: requirements.txt\n\
             isolated:\n\
             \x20 - pin: lxml==4.9.4\n\
             \x20   import: lxml.etree\n\
             \x20 - pin: faiss-cpu==1.7.4\n\
             \x20   import: faiss\n",
            self.venv_path().display()
        );
        self.write_file("provenv.yaml", &yaml);
        self.write_file("requirements.txt", "# application dependencies\n");
    }

    /// Write a file under the test host root
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Install an executable stub on the test PATH
    pub fn stub(&self, name: &str, body: &str) {
        let path = self.stub_dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod stub");
    }

    /// apt-get stub that records its invocations and succeeds
    pub fn stub_apt_ok(&self) {
        self.stub(
            "apt-get",
            "echo \"apt-get $@\" >> \"$(dirname \"$0\")/apt.log\"\nexit 0",
        );
    }

    /// apt-get stub whose `update` fails like a dead mirror
    pub fn stub_apt_dead_mirror(&self) {
        self.stub(
            "apt-get",
            "if [ \"$1\" = \"update\" ]; then\n\
             \x20 echo 'E: Unable to fetch some archives' >&2\n\
             \x20 exit 100\n\
             fi\n\
             exit 0",
        );
    }

    /// dpkg-query stub reporting no package installed
    pub fn stub_dpkg_none(&self) {
        self.stub(
            "dpkg-query",
            "if [ $# -ge 4 ]; then\n\
             \x20 echo \"dpkg-query: no packages found matching $4\" >&2\n\
             \x20 exit 1\n\
             fi\n\
             exit 0",
        );
    }

    /// dpkg-query stub reporting the test manifest packages as installed
    pub fn stub_dpkg_all_installed(&self) {
        self.stub(
            "dpkg-query",
            "if [ $# -ge 4 ]; then\n\
             \x20 printf 'install ok installed'\n\
             \x20 exit 0\n\
             fi\n\
             printf 'swig\\tinstall ok installed\\nlibxml2-dev\\tinstall ok installed\\n'\n\
             exit 0",
        );
    }

    /// python3.11 stub whose `-m venv` lays out a fake venv with a
    /// working in-venv python
    pub fn stub_python(&self) {
        self.stub("venv-python", &venv_python_body("3.11.9", GOOD_FREEZE));
        self.stub(
            "python3.11",
            "if [ \"$1\" = \"-m\" ] && [ \"$2\" = \"venv\" ]; then\n\
             \x20 dir=\"$3\"\n\
             \x20 mkdir -p \"$dir/bin\"\n\
             \x20 echo 'home = /usr/bin' > \"$dir/pyvenv.cfg\"\n\
             \x20 cp \"$(dirname \"$0\")/venv-python\" \"$dir/bin/python\"\n\
             \x20 chmod +x \"$dir/bin/python\"\n\
             \x20 exit 0\n\
             fi\n\
             exit 0",
        );
    }

    /// All stubs for a host that already has every OS package
    pub fn stub_provisioned_host(&self) {
        self.stub_apt_ok();
        self.stub_dpkg_all_installed();
        self.stub_python();
    }

    /// All stubs for a bare host with nothing installed
    pub fn stub_clean_host(&self) {
        self.stub_apt_ok();
        self.stub_dpkg_none();
        self.stub_python();
    }

    /// Replace the in-venv python (after venv creation) with one that
    /// reports a different interpreter version
    pub fn break_venv_python_version(&self, version: &str) {
        let python = self.venv_path().join("bin").join("python");
        fs::write(
            &python,
            format!("#!/bin/sh\n{}\n", venv_python_body(version, GOOD_FREEZE)),
        )
        .expect("Failed to rewrite venv python");
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod venv python");
    }

    /// Recorded apt-get invocations, one per line
    pub fn apt_log(&self) -> String {
        fs::read_to_string(self.stub_dir.join("apt.log")).unwrap_or_default()
    }

    /// Build a provenv command running against this test host
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("provenv").expect("provenv binary");
        let path_var = std::env::var("PATH").unwrap_or_default();
        cmd.current_dir(&self.path)
            .env("PATH", format!("{}:{}", self.stub_dir.display(), path_var))
            .arg("--manifest")
            .arg(self.manifest_path());
        cmd
    }

    /// Same command without the --manifest flag
    #[allow(deprecated)]
    pub fn bare_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("provenv").expect("provenv binary");
        let path_var = std::env::var("PATH").unwrap_or_default();
        cmd.current_dir(&self.path)
            .env("PATH", format!("{}:{}", self.stub_dir.display(), path_var));
        cmd
    }
}

fn venv_python_body(version: &str, freeze: &str) -> String {
    format!(
        "if [ \"$1\" = \"--version\" ]; then\n\
         \x20 echo 'Python {version}'\n\
         \x20 exit 0\n\
         fi\n\
         if [ \"$1\" = \"-m\" ] && [ \"$2\" = \"pip\" ]; then\n\
         \x20 case \"$3\" in\n\
         \x20   freeze) printf '{freeze}'; exit 0 ;;\n\
         \x20   install) exit 0 ;;\n\
         \x20   cache) exit 0 ;;\n\
         \x20 esac\n\
         \x20 exit 0\n\
         fi\n\
         if [ \"$1\" = \"-c\" ]; then\n\
         \x20 exit 0\n\
         fi\n\
         exit 0"
    )
}
