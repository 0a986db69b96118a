// ==========================================
// 维修服务追踪系统 - 请求校验
// ==========================================
// 职责: 表单/请求体的形态校验（不访问数据库）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::customer::CustomerInput;

/// 客户表单校验: 名称、联系人、电话、地址非空，邮箱格式合法
pub fn validate_customer_input(input: &CustomerInput) -> ApiResult<()> {
    let mut problems = Vec::new();

    let required = [
        ("name", &input.name),
        ("contactName", &input.contact_name),
        ("phone", &input.phone),
        ("address", &input.address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            problems.push(format!("{} 不能为空", field));
        }
    }

    if !is_valid_email(&input.email) {
        problems.push(format!("email 格式无效: '{}'", input.email.trim()));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(problems.join("; ")))
    }
}

/// 数据库路径非空
pub fn validate_file_path(file_path: &str) -> ApiResult<()> {
    if file_path.trim().is_empty() {
        return Err(ApiError::InvalidInput("filePath 不能为空".to_string()));
    }
    Ok(())
}

/// 简单的邮箱语法检查: local@domain.tld，不含空白
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ErrorKind;

    fn valid_input() -> CustomerInput {
        CustomerInput {
            name: "Acme".to_string(),
            contact_name: "Pat".to_string(),
            phone: "555-0100".to_string(),
            email: "pat@acme.test".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email(" ops@acme.example.com "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@b..co"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_customer_input_validation() {
        assert!(validate_customer_input(&valid_input()).is_ok());

        let input = CustomerInput {
            phone: " ".to_string(),
            email: "nope".to_string(),
            ..valid_input()
        };
        let err = validate_customer_input(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let message = err.to_string();
        assert!(message.contains("phone"));
        assert!(message.contains("email"));
    }
}
