use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::commands::{MemberFields, required_text};
use super::errors::Result;
use super::{Email, MemberCode, MemberId};

/// 会員
///
/// 不変条件：
/// - `member_code` は一意で、登録後は変更不可
/// - `email` は `local@domain.tld` 形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(rename = "memberId")]
    pub member_code: MemberCode,
    pub email: Email,
    pub phone: String,
    pub join_date: NaiveDate,
}

/// 検証済みの会員属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDetails {
    pub name: String,
    pub email: Email,
    pub phone: String,
}

/// 純粋関数：会員の入力項目を検証する
pub fn validate_member_fields(fields: &MemberFields) -> Result<MemberDetails> {
    let name = required_text("name", &fields.name)?;
    let email = Email::parse(&required_text("email", &fields.email)?)?;
    let phone = required_text("phone", &fields.phone)?;

    Ok(MemberDetails { name, email, phone })
}

/// 純粋関数：会員を登録する
pub fn register_member(
    id: MemberId,
    member_code: MemberCode,
    details: MemberDetails,
    joined_on: NaiveDate,
) -> Member {
    Member {
        id,
        name: details.name,
        member_code,
        email: details.email,
        phone: details.phone,
        join_date: joined_on,
    }
}

/// 純粋関数：会員情報を更新する（会員コードと入会日は保持）
pub fn revise_member(member: &Member, details: MemberDetails) -> Member {
    Member {
        name: details.name,
        email: details.email,
        phone: details.phone,
        ..member.clone()
    }
}
