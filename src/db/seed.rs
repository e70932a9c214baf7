//! Startup seed data
//!
//! Populates empty repositories with the storefront's launch catalog: the
//! admin account, five categories, four products and three blog posts.

use super::Repositories;
use crate::models::{BlogPost, Category, Product, User};
use crate::services::password::hash_password_blocking;
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

const IMG: &str = "https://images.unsplash.com";
const IMG_PARAMS: &str = "ixlib=rb-4.0.3&ixid=M3wxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8fA%3D%3D&auto=format&fit=crop";

fn image(photo: &str, width: u32) -> String {
    format!("{IMG}/{photo}?{IMG_PARAMS}&w={width}&q=80")
}

/// Counts of what [`seed`] inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub categories: usize,
    pub products: usize,
    pub blog_posts: usize,
}

/// Insert the launch data. Skipped entirely when any category already exists.
pub async fn seed(repos: &Repositories, admin_username: &str, admin_password: &str) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    if repos.categories.count().await? > 0 {
        return Ok(report);
    }

    if !repos.users.exists_by_username(admin_username).await? {
        let hash = hash_password_blocking(admin_password.to_string())
            .await
            .context("Failed to hash admin password")?;
        repos
            .users
            .create(&User::new(admin_username, hash, true))
            .await
            .context("Failed to seed admin user")?;
        report.users += 1;
    }

    let mut category_ids = Vec::new();
    for category in seed_categories() {
        let created = repos
            .categories
            .create(&category)
            .await
            .with_context(|| format!("Failed to seed category '{}'", category.slug))?;
        category_ids.push(created.id);
        report.categories += 1;
    }

    for (category_index, mut product) in seed_products() {
        product.category_id = *category_ids
            .get(category_index)
            .context("Seed product references a missing category")?;
        repos
            .products
            .create(&product)
            .await
            .with_context(|| format!("Failed to seed product '{}'", product.slug))?;
        report.products += 1;
    }

    for post in seed_blog_posts() {
        repos
            .blog_posts
            .create(&post)
            .await
            .with_context(|| format!("Failed to seed blog post '{}'", post.slug))?;
        report.blog_posts += 1;
    }

    tracing::info!(
        categories = report.categories,
        products = report.products,
        blog_posts = report.blog_posts,
        "Seeded catalog"
    );
    Ok(report)
}

fn seed_categories() -> Vec<Category> {
    vec![
        Category::new("Chăm sóc da", "cham-soc-da", image("photo-1571781926291-c477ebfd024b", 500)),
        Category::new("Trang điểm", "trang-diem", image("photo-1512496015851-a90fb38ba796", 500)),
        Category::new("Chăm sóc tóc", "cham-soc-toc", image("photo-1598528738936-c50861003c7d", 500)),
        Category::new("Nước hoa", "nuoc-hoa", image("photo-1619994403073-2cec844b8e63", 500)),
        Category::new(
            "Dụng cụ làm đẹp",
            "dung-cu-lam-dep",
            image("photo-1567721913486-6585f069b332", 500),
        ),
    ]
}

/// Products paired with the index of their category in [`seed_categories`]
fn seed_products() -> Vec<(usize, Product)> {
    #[allow(clippy::too_many_arguments)]
    fn product(
        name: &str,
        slug: &str,
        description: &str,
        price: i64,
        sale_price: Option<i64>,
        photo: &str,
        stock: i64,
        is_new: bool,
        rating: f64,
        num_reviews: i64,
    ) -> Product {
        Product {
            id: 0,
            name: name.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
            price,
            sale_price,
            image_url: image(photo, 500),
            category_id: 0,
            stock,
            featured: true,
            is_new,
            rating,
            num_reviews,
        }
    }

    vec![
        (
            0,
            product(
                "Kem dưỡng ẩm cao cấp",
                "kem-duong-am-cao-cap",
                "Kem dưỡng ẩm cao cấp giúp làn da của bạn luôn mềm mại và tràn đầy sức sống.",
                500_000,
                Some(420_000),
                "photo-1567721913486-6585f069b332",
                50,
                true,
                4.5,
                18,
            ),
        ),
        (
            1,
            product(
                "Son môi dưỡng ẩm VN Beauty",
                "son-moi-duong-am-vn-beauty",
                "Son môi dưỡng ẩm với công thức đặc biệt giúp môi luôn mềm mịn và căng mọng.",
                300_000,
                Some(255_000),
                "photo-1586179253019-ac8a2522535f",
                100,
                false,
                5.0,
                32,
            ),
        ),
        (
            0,
            product(
                "Serum Vitamin C dưỡng trắng",
                "serum-vitamin-c-duong-trang",
                "Serum Vitamin C giúp làn da trắng sáng, đều màu và ngăn ngừa lão hóa hiệu quả.",
                590_000,
                None,
                "photo-1596462502278-27bfdc403348",
                30,
                false,
                4.0,
                7,
            ),
        ),
        (
            2,
            product(
                "Dầu gội thảo mộc dưỡng tóc",
                "dau-goi-thao-moc-duong-toc",
                "Dầu gội thảo mộc giúp tóc chắc khỏe, suôn mượt và giảm gãy rụng hiệu quả.",
                220_000,
                Some(180_000),
                "photo-1617897903246-719242758050",
                75,
                false,
                4.5,
                46,
            ),
        ),
    ]
}

fn seed_blog_posts() -> Vec<BlogPost> {
    let post = |title: &str, slug: &str, body: &str, photo: &str, (y, m, d): (i32, u32, u32), category: &str| {
        BlogPost {
            id: 0,
            title: title.to_string(),
            slug: slug.to_string(),
            content: body.to_string(),
            excerpt: body.to_string(),
            image_url: image(photo, 600),
            publish_date: Utc
                .with_ymd_and_hms(y, m, d, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            category: category.to_string(),
        }
    };

    vec![
        post(
            "5 bước chăm sóc da cơ bản trong mùa hè",
            "5-buoc-cham-soc-da-co-ban-trong-mua-he",
            "Mùa hè với nắng nóng và độ ẩm cao đòi hỏi một quy trình chăm sóc da đặc biệt. Bài viết này chia sẻ 5 bước đơn giản giúp bạn bảo vệ da hiệu quả...",
            "photo-1596462502278-27bfdc403348",
            (2023, 6, 12),
            "Chăm sóc da",
        ),
        post(
            "Hướng dẫn trang điểm cơ bản cho người mới bắt đầu",
            "huong-dan-trang-diem-co-ban-cho-nguoi-moi-bat-dau",
            "Bạn mới bắt đầu học cách trang điểm? Đừng lo lắng, bài viết này sẽ hướng dẫn bạn từng bước cơ bản nhất để có một lớp trang điểm tự nhiên và phù hợp...",
            "photo-1512496015851-a90fb38ba796",
            (2023, 6, 5),
            "Trang điểm",
        ),
        post(
            "Bí quyết chăm sóc tóc tự nhiên với nguyên liệu có sẵn trong nhà",
            "bi-quyet-cham-soc-toc-tu-nhien-voi-nguyen-lieu-co-san-trong-nha",
            "Mái tóc khỏe đẹp không nhất thiết phải phụ thuộc vào các sản phẩm đắt tiền. Hãy khám phá những bí quyết chăm sóc tóc từ nguyên liệu tự nhiên...",
            "photo-1598528738936-c50861003c7d",
            (2023, 5, 28),
            "Chăm sóc tóc",
        ),
    ]
}
