//! # ユーザー参照
//!
//! ユーザー管理（登録・ログイン・メール認証・権限グループ）は外部システムの
//! 責務であり、このクレートは所有者参照のための ID 型のみを提供する。
//! 受信者・メッセージ・キャンペーンはいずれも作成したユーザーを所有者として持つ。

define_uuid_id! {
    /// ユーザー ID（外部のユーザー管理サービスが発行する識別子）
    pub struct UserId;
}
