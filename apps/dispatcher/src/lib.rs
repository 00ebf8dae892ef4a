//! # mailcast ディスパッチャライブラリ
//!
//! ディスパッチエンジンと読み出し系ユースケースを公開する。
//! バイナリ（`main.rs`）とテストの双方から利用される。

pub mod config;
pub mod usecase;
