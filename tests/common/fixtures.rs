//! On-disk fixtures shared by the integration suites.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Marker line used by every seeded artifact.
pub const MARKER: &str = "### AUTOGENERATED CONFIG ###";

/// Hand-written SSH config content kept above the marker.
pub const SSH_PREAMBLE: &str = "Host bastion\n    User admin\n";

/// Panel templates registered for the `aleo` project.
pub const ALEO_PANELS: &str = r#"[
  {"title": "Block height", "type": "timeseries",
   "gridPos": {"x": 0, "y": 0, "w": 24, "h": 8},
   "targets": [{"expr": "block_height{instance=~\"$servers\"}"}]}
]"#;

/// Temporary directory laid out like a monitoring host.
#[derive(Debug)]
pub struct FleetDir {
    _tmp: TempDir,
    /// Root of the temporary directory.
    pub root: Utf8PathBuf,
}

impl FleetDir {
    /// Creates the directory with a seeded SSH config, Ansible inventory,
    /// inventory document, panel templates and an empty dashboards directory.
    pub fn seeded(inventory: &str) -> Self {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
            .unwrap_or_else(|err| panic!("temp path should be utf8: {}", err.display()));
        let dir = Self { _tmp: tmp, root };

        dir.write("servers.yaml", inventory);
        dir.write("ssh_config", &format!("{SSH_PREAMBLE}\n{MARKER}\nstale"));
        dir.write("hosts", "[local]\nlocalhost\n");
        dir.mkdir("dashboards");
        dir.mkdir("panels");
        dir.write("panels/aleo.json", ALEO_PANELS);
        dir
    }

    /// Absolute path of `relative`.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Writes `contents` to `relative`.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        std::fs::write(&path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
    }

    /// Reads `relative` as text.
    pub fn read(&self, relative: &str) -> String {
        read(&self.path(relative))
    }

    fn mkdir(&self, relative: &str) {
        let path = self.path(relative);
        std::fs::create_dir(&path).unwrap_or_else(|err| panic!("mkdir {path}: {err}"));
    }
}

/// Reads `path` as text, panicking with the path on failure.
pub fn read(path: &Utf8Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}
