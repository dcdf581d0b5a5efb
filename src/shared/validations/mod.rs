use crate::shared::types::PaginationParams;

pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> PaginationParams {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    PaginationParams { page, limit }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let p = validate_pagination(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 20);
    }

    #[test]
    fn limit_clamped() {
        let p = validate_pagination(Some(0), Some(1000));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);
    }
}
