use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use stacdag_types::Cid;
use tracing::{debug, instrument};

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// Block store backed by a flat directory.
///
/// Every block lives in `<root>/<cid>`, where `<cid>` is the textual cid.
/// Blocks are staged in a temporary file inside `root` and moved into place
/// atomically, so a reader never sees a partially written block. A block
/// that already exists is never rewritten.
#[derive(Clone, Debug)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Open (and create if needed) a block directory.
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    /// The block directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `cid`.
    pub fn block_path(&self, cid: &Cid) -> PathBuf {
        self.root.join(cid.to_string())
    }

    /// Sorted list of every block in the directory.
    ///
    /// Hidden files (in-flight temporary files) are skipped.
    pub fn cids(&self) -> StoreResult<Vec<Cid>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let mut cids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            let cid = name
                .parse::<Cid>()
                .map_err(|_| StoreError::UnexpectedEntry(entry.path()))?;
            cids.push(cid);
        }
        cids.sort();
        Ok(cids)
    }
}

impl BlockStore for FsBlockStore {
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        let path = self.block_path(cid);
        match std::fs::read(&path) {
            Ok(data) => Block::from_parts(*cid, data).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    #[instrument(skip_all, err, fields(block.cid = %block.cid(), block.size = block.size()))]
    fn put(&self, block: &Block) -> StoreResult<Cid> {
        let cid = *block.cid();
        let path = self.block_path(&cid);
        if self.has(&cid)? {
            debug!("block already present");
            return Ok(cid);
        }

        let mut staged = tempfile::Builder::new()
            .prefix(".tmp-")
            .tempfile_in(&self.root)
            .map_err(|e| StoreError::io(&self.root, e))?;
        staged
            .write_all(block.data())
            .and_then(|()| staged.as_file().sync_data())
            .map_err(|e| StoreError::io(staged.path().to_path_buf(), e))?;
        staged
            .persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        debug!(path = %path.display(), "wrote block");
        Ok(cid)
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        let path = self.block_path(cid);
        path.try_exists().map_err(|e| StoreError::io(path, e))
    }
}
