/// Ordered enumeration of project keys used to sequence a multi-project document.
///
/// Keys missing from the enumeration share one rank after every listed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPriority {
    order: Vec<String>,
}

impl ProjectPriority {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut order: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim().to_uppercase();
            if !key.is_empty() && !order.contains(&key) {
                order.push(key);
            }
        }
        Self { order }
    }

    pub fn rank(&self, project_key: &str) -> usize {
        let key = project_key.trim().to_uppercase();
        self.order
            .iter()
            .position(|k| *k == key)
            .unwrap_or_else(|| self.fallback_rank())
    }

    pub fn fallback_rank(&self) -> usize {
        self.order.len()
    }

    /// Sorts by rank, then alphabetically (case-insensitive, then exact).
    pub fn sort(&self, keys: &mut [String]) {
        keys.sort_by_cached_key(|k| (self.rank(k), k.to_uppercase(), k.clone()));
    }
}

impl Default for ProjectPriority {
    fn default() -> Self {
        Self::new(["BAMA", "BIMA2", "CUU2", "COMAPI"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranks() {
        let priority = ProjectPriority::default();
        assert_eq!(priority.rank("BAMA"), 0);
        assert_eq!(priority.rank(" bima2 "), 1);
        assert_eq!(priority.rank("CUU2"), 2);
        assert_eq!(priority.rank("COMAPI"), 3);
        assert_eq!(priority.rank("PORTAL"), 4);
        assert_eq!(priority.fallback_rank(), 4);
    }

    #[test]
    fn test_total_order() {
        let priority = ProjectPriority::default();
        let mut keys: Vec<String> = ["ZED", "COMAPI", "alpha", "BAMA", "Alpha", "CUU2"]
            .iter()
            .map(|k| k.to_string())
            .collect();
        priority.sort(&mut keys);
        assert_eq!(keys, vec!["BAMA", "CUU2", "COMAPI", "Alpha", "alpha", "ZED"]);
    }

    #[test]
    fn test_substituted_ordering() {
        let priority = ProjectPriority::new(["CUU2", "BAMA", "cuu2", ""]);
        let mut keys = vec!["BAMA".to_string(), "CUU2".to_string()];
        priority.sort(&mut keys);
        assert_eq!(keys, vec!["CUU2", "BAMA"]);
        assert_eq!(priority.fallback_rank(), 2);
    }
}
