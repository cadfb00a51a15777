use crate::config::OpenParams;
use crate::error::Result;
use crate::repo::BoxRepo;
use crate::repo_fs::FsBoxRepo;
use crate::repo_mem::MemBoxRepo;

pub enum Backend {
    Fs,
    Memory,
}

pub fn open_repo(backend: Backend, p: &OpenParams) -> Result<Box<dyn BoxRepo>> {
    match backend {
        Backend::Fs => Ok(Box::new(FsBoxRepo::open(p.paths())?)),
        Backend::Memory => Ok(Box::new(MemBoxRepo::new())),
    }
}
