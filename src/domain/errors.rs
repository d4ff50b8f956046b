/// 有効化のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivateError {
    /// 既に有効化済み（確認待ち状態のみ有効化できる）
    AlreadyActive,
}

/// 部分更新のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// ブラジル国籍への切り替えにCPFが指定されていない
    MissingNationalId,
    /// 外国籍への切り替えにパスポートの全フィールドが揃っていない
    IncompletePassport,
}
