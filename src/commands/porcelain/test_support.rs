use crate::areas::repository::Repository;
use assert_fs::TempDir;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Writer whose output stays readable after it is handed to a repository
#[derive(Clone, Default)]
pub(crate) struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub(crate) fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8(bytes).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub(crate) async fn init_repository(dir: &TempDir) -> (Repository, SharedOutput) {
    let output = SharedOutput::default();
    let mut repository = Repository::new(dir.path(), Box::new(output.clone())).unwrap();
    repository.init().await.unwrap();
    output.take();

    (repository, output)
}

pub(crate) fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub(crate) fn read(dir: &TempDir, name: &str) -> Option<String> {
    std::fs::read_to_string(dir.path().join(name)).ok()
}
