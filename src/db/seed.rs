// src/db/seed.rs

use chrono::{TimeDelta, Utc};
use uuid::{uuid, Uuid};

use crate::models::warehouse::{Product, Warehouse};

// Linha de saldo na carga inicial (referencia o produto pelo uuid, não pelo artigo).
#[derive(Debug, Clone)]
pub struct SeedStock {
    pub warehouse_uuid: Uuid,
    pub product_uuid: Uuid,
    pub quantity: i64,
    pub reserved_quantity: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub warehouses: Vec<Warehouse>,
    pub products: Vec<Product>,
    pub stock: Vec<SeedStock>,
}

const WAREHOUSE_1: Uuid = uuid!("af5fc7cd-afb0-43f8-a9d2-ce532512b2ac");
const WAREHOUSE_2: Uuid = uuid!("f1dd9277-a8af-49ee-a5b1-3f8ee9e74cfd");
const WAREHOUSE_3: Uuid = uuid!("c1bf338d-1953-4b9f-8dd7-71dfca0a29cc");

const PRODUCT_1: Uuid = uuid!("854427c7-c53c-40be-935f-a97df1c89a13");
const PRODUCT_2: Uuid = uuid!("a8bff1ba-125a-45cb-b779-a1f5b813f0c3");
const PRODUCT_3: Uuid = uuid!("c175b84e-a62c-4094-871f-4c03c34aa37e");
const PRODUCT_4: Uuid = uuid!("5cb17c38-aa38-4797-a295-475244bb2e53");
const PRODUCT_5: Uuid = uuid!("d19031d1-eb57-4e2b-9c0b-db80fd694a51");
const PRODUCT_6: Uuid = uuid!("463d8a77-7916-4c1f-94b3-2408017f22da");

impl SeedData {
    /// Três armazéns (o segundo indisponível), seis produtos e seus saldos.
    pub fn demo() -> Self {
        // created_at crescente: armazém 1 é consumido antes do 3.
        let base = Utc::now();
        let warehouses = [
            (WAREHOUSE_1, "warehouse1", true),
            (WAREHOUSE_2, "warehouse2", false),
            (WAREHOUSE_3, "warehouse3", true),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (uuid, name, is_available))| Warehouse {
            uuid,
            name: name.to_string(),
            is_available,
            created_at: base + TimeDelta::seconds(i as i64),
        })
        .collect();

        let products = [
            (PRODUCT_1, "product1", "10", "123"),
            (PRODUCT_2, "product2", "20", "456"),
            (PRODUCT_3, "product3", "30", "789"),
            (PRODUCT_4, "product4", "40", "987"),
            (PRODUCT_5, "product5", "50", "654"),
            (PRODUCT_6, "product6", "60", "321"),
        ]
        .into_iter()
        .map(|(uuid, name, size, article)| Product {
            uuid,
            name: name.to_string(),
            size: size.to_string(),
            article: article.to_string(),
        })
        .collect();

        let stock = [
            (WAREHOUSE_1, PRODUCT_1, 15, 0),
            (WAREHOUSE_1, PRODUCT_2, 25, 2),
            (WAREHOUSE_1, PRODUCT_3, 35, 5),
            (WAREHOUSE_1, PRODUCT_4, 45, 7),
            (WAREHOUSE_2, PRODUCT_6, 12, 0),
            (WAREHOUSE_2, PRODUCT_4, 32, 23),
            (WAREHOUSE_3, PRODUCT_6, 10, 30),
            (WAREHOUSE_3, PRODUCT_4, 0, 20),
            (WAREHOUSE_3, PRODUCT_5, 2, 5),
        ]
        .into_iter()
        .map(|(warehouse_uuid, product_uuid, quantity, reserved_quantity)| SeedStock {
            warehouse_uuid,
            product_uuid,
            quantity,
            reserved_quantity,
        })
        .collect();

        Self { warehouses, products, stock }
    }
}
