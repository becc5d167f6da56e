use crate::Folder;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("No root folder found")]
    NoRoot,
    #[error("Parent folder with ID {0} not found")]
    MissingParent(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub folder: Folder,
    /// Child folder ids in listing order.
    pub children: Vec<u64>,
}

/// Adjacency list view over a flat folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTree {
    root: u64,
    nodes: HashMap<u64, FolderNode>,
}

impl FolderTree {
    /// Build the tree. The first parentless folder becomes the root; every
    /// other folder's parent must be present in `folders`.
    pub fn from_folders(folders: &[Folder]) -> Result<Self, TreeError> {
        let root = folders
            .iter()
            .find(|f| f.parent_folder_id.is_none())
            .ok_or(TreeError::NoRoot)?
            .id;

        let mut nodes: HashMap<u64, FolderNode> = folders
            .iter()
            .map(|f| {
                (
                    f.id,
                    FolderNode {
                        folder: f.clone(),
                        children: Vec::new(),
                    },
                )
            })
            .collect();

        for folder in folders {
            let Some(parent_id) = folder.parent_folder_id else {
                continue;
            };
            let parent = nodes
                .get_mut(&parent_id)
                .ok_or(TreeError::MissingParent(parent_id))?;
            parent.children.push(folder.id);
        }

        Ok(Self { root, nodes })
    }

    pub fn root(&self) -> &FolderNode {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: u64) -> Option<&FolderNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first walk from the root, yielding `(depth, folder)`.
    pub fn walk(&self) -> Vec<(usize, &Folder)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0usize, self.root)];
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            out.push((depth, &node.folder));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }
}
