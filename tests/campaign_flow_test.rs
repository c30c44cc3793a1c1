use anyhow::Result;
use doorbel_reports::core::Pipeline;
use doorbel_reports::domain::model::{CampaignOutcome, Collection, Record};
use doorbel_reports::{run_campaign, ExportPipeline, HttpBulkSender, LocalStorage, ReportConfig};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn campaign_toml(base_url: &str, cities: &str) -> String {
    format!(
        r#"
[job]
name = "accra-launch-campaign"
description = "Notify waitlisted customers about the Accra launch"

[api]
base_url = "{base}"
page_size = 50

[export]
output_path = "./exports"
collections = ["waitlist"]

[campaign]
notify_endpoint = "{base}/notifications/bulk"

[campaign.audience]
cities = [{cities}]
roles = ["customer"]

[campaign.message]
subject = "Launch update"
content = "DoorBel goes live in Accra this Friday!"
"#,
        base = base_url,
        cities = cities
    )
}

fn mock_waitlist(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/waitlist/users").query_param("page", "1");
        then.status(200).json_body(json!({
            "data": [
                {
                    "email": "ama@example.com",
                    "firstName": "Ama",
                    "city": "accra",
                    "role": "customer",
                    "status": "confirmed",
                    "createdAt": "2024-02-01T10:00:00Z"
                },
                {
                    // 符合條件但沒有 email，不該出現在收件名單
                    "firstName": "Yaa",
                    "city": "accra",
                    "role": "customer",
                    "status": "pending",
                    "createdAt": "2024-02-02T10:00:00Z"
                },
                {
                    "email": "kofi@example.com",
                    "firstName": "Kofi",
                    "city": "kumasi",
                    "role": "rider",
                    "status": "confirmed",
                    "createdAt": "2024-02-03T10:00:00Z"
                }
            ]
        }));
    })
}

async fn fetch_waitlist(config: ReportConfig) -> Result<Vec<Record>> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let pipeline = ExportPipeline::new(storage, config, Collection::Waitlist);
    Ok(pipeline.extract().await?)
}

/// 完整的行銷流程：抓 waitlist -> 篩選受眾 -> 整批交給通知服務
#[tokio::test]
async fn test_campaign_sends_to_matching_audience_only() -> Result<()> {
    let server = MockServer::start();
    let waitlist_mock = mock_waitlist(&server);

    // 通知服務收到的 body 必須只含有 email 的 Accra 客戶
    let notify_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/notifications/bulk")
            .header("Authorization", "Bearer campaign-secret")
            .json_body(json!({
                "recipients": [
                    {
                        "email": "ama@example.com",
                        "firstName": "Ama",
                        "city": "accra",
                        "role": "customer"
                    }
                ],
                "subject": "Launch update",
                "content": "DoorBel goes live in Accra this Friday!"
            }));
        then.status(200).json_body(json!([
            {
                "recipient": {
                    "email": "ama@example.com",
                    "firstName": "Ama",
                    "city": "accra",
                    "role": "customer"
                },
                "result": { "success": true, "messageId": "msg-001" }
            }
        ]));
    });

    let config = ReportConfig::from_toml_str(&campaign_toml(&server.base_url(), "\"accra\""))?;
    let campaign = config.campaign.clone().unwrap();

    let waitlist = fetch_waitlist(config).await?;
    waitlist_mock.assert();
    assert_eq!(waitlist.len(), 3);

    let endpoint = campaign.notify_endpoint.clone().unwrap();
    let sender = HttpBulkSender::new(endpoint, Some("campaign-secret".to_string()), 5);

    println!("📨 Running campaign...");
    let outcome = run_campaign(&sender, &waitlist, &campaign.audience, &campaign.message).await?;
    notify_mock.assert();

    match outcome {
        CampaignOutcome::Sent(result) => {
            assert_eq!(result.total, 1);
            assert_eq!(result.sent, 1);
            assert_eq!(result.failed, 0);
            assert_eq!(result.results[0].recipient.email, "ama@example.com");
        }
        CampaignOutcome::NoRecipients => panic!("expected a delivery"),
    }

    println!("✅ Campaign flow test passed!");
    Ok(())
}

/// 沒有任何人符合受眾時不能打通知服務
#[tokio::test]
async fn test_campaign_with_no_matches_never_calls_sender() -> Result<()> {
    let server = MockServer::start();
    let waitlist_mock = mock_waitlist(&server);

    let notify_mock = server.mock(|when, then| {
        when.method(POST).path("/notifications/bulk");
        then.status(200).json_body(json!([]));
    });

    let config = ReportConfig::from_toml_str(&campaign_toml(&server.base_url(), "\"tamale\""))?;
    let campaign = config.campaign.clone().unwrap();

    let waitlist = fetch_waitlist(config).await?;
    waitlist_mock.assert();

    let endpoint = campaign.notify_endpoint.clone().unwrap();
    let sender = HttpBulkSender::new(endpoint, None, 5);

    let outcome = run_campaign(&sender, &waitlist, &campaign.audience, &campaign.message).await?;

    assert!(matches!(outcome, CampaignOutcome::NoRecipients));
    assert_eq!(notify_mock.hits(), 0);

    Ok(())
}

/// 部分寄送失敗時統計要對得上
#[tokio::test]
async fn test_campaign_tallies_partial_failures() -> Result<()> {
    let server = MockServer::start();
    let waitlist_mock = server.mock(|when, then| {
        when.method(GET).path("/waitlist/users").query_param("page", "1");
        then.status(200).json_body(json!([
            {
                "email": "ama@example.com",
                "firstName": "Ama",
                "city": "accra",
                "role": "customer",
                "status": "confirmed"
            },
            {
                "email": "esi@example.com",
                "firstName": "Esi",
                "city": "accra",
                "role": "customer",
                "status": "pending"
            }
        ]));
    });

    let notify_mock = server.mock(|when, then| {
        when.method(POST).path("/notifications/bulk");
        then.status(200).json_body(json!([
            {
                "recipient": {
                    "email": "ama@example.com",
                    "firstName": "Ama",
                    "city": "accra",
                    "role": "customer"
                },
                "result": { "success": true, "messageId": "msg-010" }
            },
            {
                "recipient": {
                    "email": "esi@example.com",
                    "firstName": "Esi",
                    "city": "accra",
                    "role": "customer"
                },
                "result": { "success": false, "error": "mailbox unavailable" }
            }
        ]));
    });

    let config = ReportConfig::from_toml_str(&campaign_toml(&server.base_url(), "\"accra\""))?;
    let campaign = config.campaign.clone().unwrap();

    let waitlist = fetch_waitlist(config).await?;
    waitlist_mock.assert();

    let endpoint = campaign.notify_endpoint.clone().unwrap();
    let sender = HttpBulkSender::new(endpoint, None, 5);

    let outcome = run_campaign(&sender, &waitlist, &campaign.audience, &campaign.message).await?;
    notify_mock.assert();

    match outcome {
        CampaignOutcome::Sent(result) => {
            assert_eq!(result.total, 2);
            assert_eq!(result.sent, 1);
            assert_eq!(result.failed, 1);
            let failed = &result.results[1];
            assert!(!failed.result.success);
            assert_eq!(failed.result.error.as_deref(), Some("mailbox unavailable"));
        }
        CampaignOutcome::NoRecipients => panic!("expected a delivery"),
    }

    Ok(())
}
