use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 料金ポリシー
///
/// ハードコードされた定数ではなく、レンタルエンジンの構築時に注入される
/// 名前付き設定値。パラメータを変えた状態で料金ルールをテストできる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingPolicy {
    /// レンタル開始時に徴収する固定初期料金
    pub initial_fee: Decimal,
    /// 初期料金に含まれる無料時間（分）
    pub free_minutes: i64,
    /// 超過課金のブロック長（分）
    pub block_minutes: i64,
    /// 開始済みブロック1つあたりの追加料金
    pub block_fee: Decimal,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            initial_fee: dec!(10.00),
            free_minutes: 120,
            block_minutes: 30,
            block_fee: dec!(5.00),
        }
    }
}

impl BillingPolicy {
    /// 純粋関数：超過料金を計算する
    ///
    /// ビジネスルール：
    /// - 最初の`free_minutes`分は初期料金に含まれる（追加課金なし）
    /// - 境界は厳密に「elapsed > free_minutes」。ちょうど無料枠までなら0.00
    /// - 超過分は開始済みの`block_minutes`ブロックごとに`block_fee`（切り上げ）
    pub fn overage_fee(&self, elapsed_minutes: i64) -> Decimal {
        if elapsed_minutes <= self.free_minutes {
            return Decimal::ZERO;
        }

        let excess = elapsed_minutes - self.free_minutes;
        // 正の整数同士の切り上げ除算
        let blocks = (excess + self.block_minutes - 1) / self.block_minutes;

        self.block_fee * Decimal::from(blocks)
    }
}
