use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已运行的浏览器并获取页面
///
/// 开发排障时用：连到带 --remote-debugging-port 启动的浏览器，
/// 复用已登录的门户会话。
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 复用第一个已打开的页面，否则新建
    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    let page = if let Some(p) = pages.into_iter().next() {
        p
    } else {
        browser.new_page("about:blank").await.map_err(|e| {
            error!("创建空白页面失败: {}", e);
            e
        })?
    };

    if let Some(url) = target_url {
        page.goto(url).await.map_err(|e| {
            error!("导航到 {} 失败: {}", url, e);
            e
        })?;
        info!("已导航到: {}", url);
    }

    Ok((browser, page))
}
