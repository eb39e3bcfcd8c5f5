use crate::collage::labels::Labels;
use crate::collage_types::{FieldValue, UserInfo};

type Accessor = fn(&UserInfo) -> Option<&FieldValue>;

enum FieldKind {
    /// Before/after pair, present halves joined with " / "
    Paired {
        before: Accessor,
        after: Accessor,
        unit: fn(&Labels) -> Option<&'static str>,
    },
    Single(Accessor),
}

struct FooterField {
    label: fn(&Labels) -> &'static str,
    kind: FieldKind,
}

const PAIR_SEPARATOR: &str = " / ";

fn no_unit(_: &Labels) -> Option<&'static str> {
    None
}

/// Questionnaire fields in rendering order
fn footer_fields() -> [FooterField; 9] {
    [
        FooterField {
            label: |l| l.bot_age,
            kind: FieldKind::Paired {
                before: |u| u.bot_age_before.as_ref(),
                after: |u| u.bot_age_after.as_ref(),
                unit: no_unit,
            },
        },
        FooterField {
            label: |l| l.real_age,
            kind: FieldKind::Paired {
                before: |u| u.real_age_before.as_ref(),
                after: |u| u.real_age_after.as_ref(),
                unit: no_unit,
            },
        },
        FooterField {
            label: |l| l.weight,
            kind: FieldKind::Paired {
                before: |u| u.weight_before.as_ref(),
                after: |u| u.weight_after.as_ref(),
                unit: |l| Some(l.kg),
            },
        },
        FooterField {
            label: |l| l.height,
            kind: FieldKind::Paired {
                before: |u| u.height_before.as_ref(),
                after: |u| u.height_after.as_ref(),
                unit: |l| Some(l.cm),
            },
        },
        FooterField {
            label: |l| l.gender,
            kind: FieldKind::Single(|u| u.gender.as_ref()),
        },
        FooterField {
            label: |l| l.skin_type,
            kind: FieldKind::Single(|u| u.skin_type.as_ref()),
        },
        FooterField {
            label: |l| l.procedures,
            kind: FieldKind::Single(|u| u.procedures.as_ref()),
        },
        FooterField {
            label: |l| l.comment_before,
            kind: FieldKind::Single(|u| u.comments_before.as_ref()),
        },
        FooterField {
            label: |l| l.comment_after,
            kind: FieldKind::Single(|u| u.comments_after.as_ref()),
        },
    ]
}

/// Questionnaire lines for the footer, only for fields the user filled in
pub fn compose_footer_lines(user_info: &UserInfo, labels: &Labels) -> Vec<String> {
    footer_fields()
        .iter()
        .filter_map(|field| {
            let value = match &field.kind {
                FieldKind::Paired {
                    before,
                    after,
                    unit,
                } => {
                    let unit = unit(labels);
                    let values: Vec<String> = [before(user_info), after(user_info)]
                        .into_iter()
                        .flatten()
                        .filter(|v| v.is_present())
                        .map(|v| match unit {
                            Some(unit) => format!("{} {}", v, unit),
                            None => v.to_string(),
                        })
                        .collect();

                    if values.is_empty() {
                        None
                    } else {
                        Some(values.join(PAIR_SEPARATOR))
                    }
                }
                FieldKind::Single(get) => get(user_info)
                    .filter(|v| v.is_present())
                    .map(|v| v.to_string()),
            }?;

            Some(format!("{}: {}", (field.label)(labels), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::labels::{EN, RU};
    use serde_json::json;

    fn user_info(value: serde_json::Value) -> UserInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_user_info_has_no_lines() {
        assert!(compose_footer_lines(&UserInfo::default(), &EN).is_empty());
    }

    #[test]
    fn test_single_half_has_no_stray_separator() {
        let lines = compose_footer_lines(&user_info(json!({"weightBefore": 70})), &EN);
        assert_eq!(lines, vec!["Weight: 70 kg"]);

        let lines = compose_footer_lines(&user_info(json!({"heightAfter": "168"})), &EN);
        assert_eq!(lines, vec!["Height: 168 cm"]);
    }

    #[test]
    fn test_all_fields_present_in_fixed_order() {
        let info = user_info(json!({
            "commentsAfter": "skin feels firmer",
            "commentsBefore": "tired look",
            "procedures": "none",
            "skinType": "dry",
            "gender": "female",
            "heightBefore": 165,
            "heightAfter": 165,
            "weightBefore": 70,
            "weightAfter": 66.5,
            "realAgeBefore": 36,
            "realAgeAfter": 37,
            "botAgeBefore": 41,
            "botAgeAfter": 35,
            "username": "anna"
        }));

        assert_eq!(
            compose_footer_lines(&info, &EN),
            vec![
                "Bot age: 41 / 35",
                "Age: 36 / 37",
                "Weight: 70 kg / 66.5 kg",
                "Height: 165 cm / 165 cm",
                "Gender: female",
                "Skin type: dry",
                "Procedures: none",
                "Comment (before): tired look",
                "Comment (after): skin feels firmer",
            ]
        );
    }

    #[test]
    fn test_partial_fields_keep_relative_order() {
        let info = user_info(json!({
            "commentsAfter": "better",
            "gender": "male",
            "botAgeAfter": 30
        }));

        assert_eq!(
            compose_footer_lines(&info, &EN),
            vec!["Bot age: 30", "Gender: male", "Comment (after): better"]
        );
    }

    #[test]
    fn test_blank_and_zero_values_are_skipped() {
        let info = user_info(json!({
            "realAgeBefore": 0,
            "realAgeAfter": null,
            "gender": "  ",
            "procedures": "",
            "skinType": "oily"
        }));

        assert_eq!(compose_footer_lines(&info, &EN), vec!["Skin type: oily"]);
    }

    #[test]
    fn test_no_line_is_blank() {
        let info = user_info(json!({
            "weightBefore": "",
            "weightAfter": 60,
            "commentsBefore": "ok"
        }));

        let lines = compose_footer_lines(&info, &EN);
        assert_eq!(lines, vec!["Weight: 60 kg", "Comment (before): ok"]);
        assert!(lines.iter().all(|l| !l.trim().is_empty() && !l.contains(" /  ")));
    }

    #[test]
    fn test_localized_footer() {
        let info = user_info(json!({"weightBefore": 70, "gender": "ж"}));
        assert_eq!(
            compose_footer_lines(&info, &RU),
            vec!["Вес: 70 кг", "Пол: ж"]
        );
    }
}
