//! Fake runtime home and artifact on disk
//!
//! `bin/java` is a shell script that prints its arguments and working
//! directory, then stays up until it is terminated. `bin/jps` lists every host
//! process with `ps`, so the real reaper finds the script by the tag on its
//! command line.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_JAVA: &str = "#!/bin/sh
echo \"started $*\"
printf 'cwd '
pwd -P
trap 'kill $! 2>/dev/null; exit 143' TERM
sleep 30 >/dev/null 2>&1 &
wait
";

const FAKE_JPS: &str = "#!/bin/sh
exec ps -eo pid=,args=
";

/// Temporary directory holding `app.jar` and `jdk/bin/{java,jps}`
pub struct TestFixtures {
    dir: TempDir,
}

impl TestFixtures {
    pub const ARTIFACT_NAME: &'static str = "app.jar";

    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(Self::ARTIFACT_NAME), b"PK").unwrap();

        let bin = dir.path().join("jdk").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        write_executable(&bin.join("java"), FAKE_JAVA);
        write_executable(&bin.join("jps"), FAKE_JPS);

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn artifact(&self) -> PathBuf {
        self.dir.path().join(Self::ARTIFACT_NAME)
    }

    pub fn runtime_home(&self) -> PathBuf {
        self.dir.path().join("jdk")
    }
}

fn write_executable(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
