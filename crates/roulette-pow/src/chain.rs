//! Read-only view of the header chain used by difficulty retargeting.

use serde::{Deserialize, Serialize};

/// Header metadata reachable through the ancestor chain.
///
/// Implementors are cheap handles into a frozen, self-consistent snapshot of
/// the chain. Retargeting only reads through this trait.
pub trait BlockIndex: Clone {
    /// Height of this header; genesis is 0.
    fn height(&self) -> u32;

    /// Header timestamp (Unix seconds), as stored in the header.
    fn time(&self) -> u32;

    /// Compact target stored in the header.
    fn bits(&self) -> u32;

    /// The parent header, `None` for genesis.
    fn prev(&self) -> Option<Self>;

    /// The ancestor at `height`, `None` if `height` is above this header or
    /// missing from the snapshot.
    fn ancestor(&self, height: u32) -> Option<Self>;
}

/// Timestamp and bits of one header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMeta {
    pub time: u32,
    pub bits: u32,
}

/// Linear chain of header metadata, indexed by height from genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderChain {
    headers: Vec<HeaderMeta>,
}

impl HeaderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain where `headers[h]` is the header at height `h`.
    pub fn from_headers(headers: Vec<HeaderMeta>) -> Self {
        HeaderChain { headers }
    }

    /// Append a header on top of the current tip.
    pub fn push(&mut self, time: u32, bits: u32) {
        self.headers.push(HeaderMeta { time, bits });
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Cursor at `height`, if present.
    pub fn at(&self, height: u32) -> Option<ChainCursor<'_>> {
        self.headers.get(height as usize)?;
        Some(ChainCursor {
            chain: self,
            height,
        })
    }

    /// Cursor at the highest header.
    pub fn tip(&self) -> Option<ChainCursor<'_>> {
        let height = u32::try_from(self.headers.len().checked_sub(1)?).ok()?;
        self.at(height)
    }

    fn meta(&self, height: u32) -> &HeaderMeta {
        &self.headers[height as usize]
    }
}

/// Position inside a `HeaderChain`.
#[derive(Debug, Clone, Copy)]
pub struct ChainCursor<'a> {
    chain: &'a HeaderChain,
    height: u32,
}

impl BlockIndex for ChainCursor<'_> {
    fn height(&self) -> u32 {
        self.height
    }

    fn time(&self) -> u32 {
        self.chain.meta(self.height).time
    }

    fn bits(&self) -> u32 {
        self.chain.meta(self.height).bits
    }

    fn prev(&self) -> Option<Self> {
        let height = self.height.checked_sub(1)?;
        self.chain.at(height)
    }

    fn ancestor(&self, height: u32) -> Option<Self> {
        if height > self.height {
            return None;
        }
        self.chain.at(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: u32) -> HeaderChain {
        let mut chain = HeaderChain::new();
        for h in 0..len {
            chain.push(h * 600, 0x1d00ffff);
        }
        chain
    }

    #[test]
    fn test_tip_and_prev() {
        let chain = chain(3);
        let tip = chain.tip().unwrap();
        assert_eq!(tip.height(), 2);
        assert_eq!(tip.time(), 1200);

        let parent = tip.prev().unwrap();
        assert_eq!(parent.height(), 1);
        let genesis = parent.prev().unwrap();
        assert_eq!(genesis.height(), 0);
        assert!(genesis.prev().is_none());
    }

    #[test]
    fn test_ancestor_bounds() {
        let chain = chain(10);
        let cursor = chain.at(5).unwrap();
        assert_eq!(cursor.ancestor(0).unwrap().time(), 0);
        assert_eq!(cursor.ancestor(5).unwrap().height(), 5);
        assert!(cursor.ancestor(6).is_none());
    }

    #[test]
    fn test_empty_chain() {
        let chain = HeaderChain::new();
        assert!(chain.is_empty());
        assert!(chain.tip().is_none());
        assert!(chain.at(0).is_none());
    }

    #[test]
    fn test_serde_transparent() {
        let chain = chain(2);
        let json = serde_json::to_string(&chain).unwrap();
        assert_eq!(json, r#"[{"time":0,"bits":486604799},{"time":600,"bits":486604799}]"#);
        let parsed: HeaderChain = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, chain);
    }

    #[test]
    fn test_serde_rejects_out_of_range_time() {
        let negative = r#"[{"time":-1,"bits":486604799}]"#;
        assert!(serde_json::from_str::<HeaderChain>(negative).is_err());
        let wide = r#"[{"time":4294967296,"bits":486604799}]"#;
        assert!(serde_json::from_str::<HeaderChain>(wide).is_err());
    }
}
