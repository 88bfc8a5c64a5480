//! PHOENIX V15 reference models on their native 64-point Rosseland depth grid.
//! Index 0 is the tau = 0 surface point.

pub(super) const GIANT_4250_TEMPERATURE: [f64; 64] = [
    2551.7718946777613, 2551.7718946777613, 2577.921256552862, 2607.580024359014,
    2640.127428980259, 2674.3287547594623, 2708.9389127355216, 2743.0887059883266,
    2776.3238332068113, 2808.4881148316695, 2839.5988222765172, 2869.7565873431427,
    2899.0881320618846, 2927.713597798514, 2955.7310263094805, 2983.21198037901,
    3010.2074975563078, 3036.7560685558283, 3062.888103002407, 3088.629820433399,
    3114.0042216009892, 3139.0303708520514, 3163.7209015478584, 3188.109050927035,
    3212.237097370287, 3236.160134879063, 3259.970116977648, 3283.798470292345,
    3307.7979295730615, 3332.156412534209, 3357.181999399996, 3383.170562934366,
    3410.352154595819, 3439.0454496510347, 3469.7788278200564, 3503.1643237065678,
    3539.5209374971896, 3579.3875628255487, 3623.5887659172135, 3673.9037359447516,
    3730.5700290589502, 3795.262392641278, 3870.1419088136868, 3960.346059601045,
    4067.8507733754636, 4195.301260183116, 4358.0710192250945, 4531.28152603079,
    4756.478778929666, 4998.151408315923, 5296.4055481984615, 5601.112789992692,
    6010.993791706663, 6360.430096199389, 6875.216159358599, 7260.444127474616,
    7504.481469364075, 7685.472606860383, 7836.603660950236, 7970.314612530754,
    8092.886139048061, 8207.965770742228, 8318.001449174037, 8422.354196761502,
];

pub(super) const GIANT_4250_GAS_PRESSURE: [f64; 64] = [
    0.0001, 4.30797022881529, 5.236332098624131, 6.351106798377664,
    7.684152553200918, 9.269447253289965, 11.143794400067195, 13.348617593351923,
    15.932073211069673, 18.951040578615984, 22.4729535630686, 26.577612170274715,
    31.35915215744949, 36.92834278913807, 43.41535963238105, 50.97315964210359,
    59.78151154713931, 70.05159655331408, 82.0320988196306, 96.01571144669862,
    112.34689471570928, 131.4311372352281, 153.74605961236966, 179.853925611153,
    210.41606851225598, 246.20975908528183, 288.1466383870111, 337.2924554899986,
    394.8894555744287, 462.3812182324883, 541.4312390275005, 633.944346680426,
    742.1014367117502, 868.388258638872, 1015.5940892325191, 1186.793602312916,
    1385.3962618384915, 1615.1688377022617, 1880.2012042117717, 2184.632329767071,
    2532.9365837158903, 2930.0025556555656, 3381.172887239515, 3891.944159004737,
    4469.864399598232, 5127.762151627459, 5884.825486474033, 6776.856996019844,
    7855.081526894315, 9167.930343791968, 10649.982958426946, 12057.372393050942,
    13110.438558774113, 13863.272338683844, 14335.933621415903, 14633.276921207495,
    14872.992873035784, 15099.9078995604, 15330.945583312152, 15575.342173599289,
    15840.048793874594, 16131.33490033305, 16455.323417619446, 16819.084490902795,
];

pub(super) const GIANT_4250_ELECTRON_PRESSURE: [f64; 64] = [
    8.821073324609378e-09, 2.7893738527844872e-05, 3.475763010385777e-05, 4.358325726594633e-05,
    5.49376619037973e-05, 6.944096568705324e-05, 8.777079037924459e-05, 0.00011069365182157557,
    0.0001391041081857578, 0.0001740663749277762, 0.00021685992102896308, 0.0002690287312464048,
    0.00033243206183743124, 0.000409296056659801, 0.0005022676543064494, 0.0006144736647939572,
    0.0007495974523499989, 0.0009119748711315628, 0.0011067115408765565, 0.001339819291919279,
    0.0016183713744569348, 0.0019506757149800854, 0.0023464580182235807, 0.002817309724584598,
    0.0033770152710023097, 0.00404206883240371, 0.004832649448682734, 0.005773759028998013,
    0.006896354542605745, 0.008239393775388985, 0.009854784996946286, 0.011808445031464375,
    0.014182192840800655, 0.01708445022735887, 0.02066752665448825, 0.025140146173874632,
    0.030760165235368266, 0.037888355568411636, 0.047043455150907715, 0.05907376090512531,
    0.0749278881219457, 0.09615065012462086, 0.12500105444925563, 0.16546976433172703,
    0.22187714105476342, 0.2994719938441842, 0.40946345012486374, 0.5448073094942937,
    0.7326220909684941, 1.001470111511725, 1.6123489280114875, 3.059285875665738,
    7.659517025445906, 16.389654966732518, 44.74713541403288, 87.62621517535572,
    130.08000634193124, 172.01343285528537, 215.4628674584832, 261.49458262738665,
    310.9596544789897, 364.6584195908525, 423.4800042191507, 487.0362432898674,
];

/// Rosseland optical depth shared by all three models.
pub(super) const REFERENCE_TAU: [f64; 64] = [
    0.0, 1e-06, 1.3459603241553642e-06, 1.8116091942004133e-06,
    2.4383540982688266e-06, 3.281927872511471e-06, 4.417344703140073e-06, 5.945570708544394e-06,
    8.002502278161051e-06, 1.0771050560367691e-05, 1.4497406703726317e-05, 1.951293422635962e-05,
    2.6263635276533353e-05, 3.5349811050301094e-05, 4.757944314009414e-05, 6.404004271197282e-05,
    8.619535664753033e-05, 0.00011601553017399716, 0.00015615230060004966, 0.0002101748011332487,
    0.00028288694346259694, 0.0003807546021222372, 0.0005124805876960931, 0.0006897785379387658,
    0.0009284145445194745, 0.0012496091412919868, 0.0016819243248808687, 0.0022638034095214467,
    0.003046989570903508, 0.0041011270705513005, 0.005519954321281568, 0.007429639507594949,
    0.01, 0.013459603241553642, 0.018116091942004132, 0.024383540982688266,
    0.032819278725114705, 0.044173447031400644, 0.05945570708544394, 0.08002502278161053,
    0.10771050560367691, 0.14497406703726315, 0.1951293422635962, 0.262636352765333,
    0.3534981105030102, 0.47579443140094146, 0.6404004271197283, 0.8619535664753032,
    1.1601553017399715, 1.5615230060004965, 2.101748011332487, 2.8288694346259664,
    3.807546021222368, 5.124805876960926, 6.897785379387658, 9.284145445194744,
    12.496091412919867, 16.81924324880869, 22.638034095214465, 30.469895709035054,
    41.011270705512956, 55.19954321281573, 74.2963950759495, 100.0,
];

pub(super) const DWARF_5000_TEMPERATURE: [f64; 64] = [
    3152.135726799822, 3152.135726799822, 3179.886218106327, 3210.1288712801124,
    3241.266262670385, 3272.7607889354667, 3304.3572569782023, 3335.891856321401,
    3367.2415172554915, 3398.3171419531827, 3429.0693501366486, 3459.493683889456,
    3489.6275816950592, 3519.537426476888, 3549.2979104269793, 3578.9696215546687,
    3608.5820555085133, 3638.1264669948177, 3667.5598365791707, 3696.8190552271944,
    3725.8393249775713, 3754.5700692866103, 3782.983729181239, 3811.0910472102123,
    3838.9307291439586, 3866.5635596204384, 3894.0805967502743, 3921.6031623074155,
    3949.272259299782, 3977.2628480532085, 4005.8484761186933, 4035.3136031799,
    4065.9189643820005, 4098.028609378997, 4132.21207874272, 4169.152277173308,
    4209.375930602619, 4253.692201134291, 4303.307395663068, 4360.358709646396,
    4426.015792161154, 4502.8161458414215, 4593.8642009083715, 4704.481791365014,
    4837.277103765602, 4995.161890276591, 5191.021325877964, 5405.052235489413,
    5672.4730298745, 5956.958434972869, 6279.574832232347, 6713.659609567181,
    7068.283823428615, 7341.579369106932, 7569.399387355707, 7771.384282642612,
    7956.560008126996, 8130.067215300567, 8295.23535580476, 8454.297794656892,
    8608.792604491851, 8759.817136932035, 8908.381417187573, 9053.612904152118,
];

pub(super) const DWARF_5000_GAS_PRESSURE: [f64; 64] = [
    0.0001, 103.77021759188104, 124.24277008441791, 147.68662864038328,
    174.5788549063143, 205.50697227447878, 241.1682212876053, 282.3850817383839,
    330.1276861503049, 385.5407737153813, 449.9744468232294, 525.0186796813236,
    612.5422650746912, 714.7378000959336, 834.1752436660854, 973.8672133563247,
    1137.3497387002217, 1328.7814870686411, 1553.0640943227097, 1815.9852946512472,
    2124.3861858322084, 2486.3547728342132, 2911.450345817666, 3410.9594260556282,
    3998.192763141616, 4688.834380238941, 5501.343106626843, 6457.4105240880735,
    7582.49196327515, 8906.412485663335, 10463.974115449, 12295.65027174523,
    14448.478784999239, 16976.930118294866, 19943.562181444348, 23419.57966924201,
    27486.09303666835, 32235.112560589503, 37769.910357802444, 44203.30850857445,
    51661.64951362882, 60287.96920779064, 70247.52186567687, 81736.50476110118,
    95014.6489805319, 110441.31648554312, 128451.3181446388, 149415.61355319116,
    172877.372164747, 196852.85253971795, 218808.32005048572, 235794.83324260332,
    248716.04154158724, 259902.15051220634, 270560.37035202334, 281251.2970695441,
    292310.8021325372, 303988.23935224063, 316495.2161310404, 330029.07640248834,
    344786.94399477146, 360975.2977861385, 378815.0921315464, 398560.54975529877,
];

pub(super) const DWARF_5000_ELECTRON_PRESSURE: [f64; 64] = [
    1.178584275696304e-08, 0.0017307383779516944, 0.0021376236005943854, 0.0026458614584680645,
    0.0032674902046043335, 0.004022199456760323, 0.004934547478564818, 0.0060335796511011034,
    0.007353198029334846, 0.008933060983189195, 0.010820009239045178, 0.013070015808251538,
    0.01575051313671946, 0.018942859387478198, 0.022744651947900065, 0.027271696164679986,
    0.03265969276207703, 0.039065917367267514, 0.04667139070102253, 0.05568430869327071,
    0.06634523843048212, 0.07893419096344273, 0.09377929097472455, 0.11127018663530279,
    0.1318700141836969, 0.1561304893608243, 0.18471539734902565, 0.21842876654355947,
    0.258245610307224, 0.3053636222574449, 0.36131133350932404, 0.42799054471764303,
    0.5077438536904452, 0.6036040396325262, 0.7196742462575672, 0.8614220668038486,
    1.0356817204943456, 1.2518741272068445, 1.5233699689514426, 1.8707802985840065,
    2.318934136677974, 2.905976580454881, 3.685664816231662, 4.741102734027859,
    6.165463243475102, 8.0848670927261, 10.795979658507655, 14.639000005752848,
    21.72739274657649, 35.619405857481624, 65.73616526821836, 148.46895477985154,
    280.48949708134955, 446.5872504194678, 646.7843119720321, 886.7448382824621,
    1172.4496091876708, 1510.8974871463217, 1910.5095785090846, 2381.1568237722954,
    2934.2666223441456, 3583.058016462456, 4343.796700597422, 5226.425256091403,
];

pub(super) const DWARF_10000_TEMPERATURE: [f64; 64] = [
    6075.740166851493, 6075.740166851493, 6132.646716061949, 6200.303627475416,
    6275.347055045441, 6353.96254937768, 6432.999001282723, 6510.188085256099,
    6584.115556068891, 6654.067176100811, 6719.834982581851, 6781.543678526338,
    6839.541931981239, 6894.372318189024, 6946.768892434518, 6997.5948920279225,
    7047.694900555472, 7097.735200270412, 7148.120623397649, 7199.014265777756,
    7250.418274144279, 7302.251718016599, 7354.400938196526, 7406.750662255396,
    7459.204561396092, 7511.664641851828, 7564.042287665202, 7616.270056645328,
    7668.335751871138, 7720.341733342018, 7772.587857504149, 7825.551393740636,
    7879.86936059489, 7936.392469681244, 7996.208463039601, 8060.528202539162,
    8130.471241234262, 8207.411892620346, 8293.073584298982, 8389.807882163308,
    8499.06053657169, 8623.144836323618, 8764.563842169904, 8926.933709050292,
    9111.771703969232, 9321.679770417115, 9562.369815513146, 9824.326567034665,
    10131.142793996256, 10429.966107418335, 10835.508922038991, 11209.488677367472,
    11636.071040625626, 12099.123773936633, 12589.111126520824, 13107.000829957056,
    13652.249896580139, 14223.347367029879, 14818.830210320013, 15442.365924380452,
    16089.258745231074, 16782.851769484223, 17493.021723477395, 18292.266194938224,
];

pub(super) const DWARF_10000_GAS_PRESSURE: [f64; 64] = [
    0.0001, 0.08321277431256849, 0.129584527404206, 0.1944353814787799,
    0.28152475987205583, 0.39485076648800205, 0.5390981979948851, 0.7201091144478128,
    0.9453313951039655, 1.224242607219485, 1.5687781271850683, 1.9937994818068905,
    2.5176163791165314, 3.162510878003026, 3.9551396687888967, 4.926715203096378,
    6.113037684069914, 7.554641456739775, 9.297360054286282, 11.393467041880696,
    13.903347188310182, 16.89759094603118, 20.459480162394012, 24.68788809192128,
    29.700596464671843, 35.638353411478114, 42.6698208468709, 50.99744033340071,
    60.86404630744194, 72.55943401798167, 86.42483291122942, 102.85459309197752,
    122.29465215618066, 145.23404516310967, 172.18492727312352, 203.65233458326483,
    240.10565634643893, 281.93616428655434, 329.39309459069386, 382.48241320170536,
    440.96332458046084, 504.3332296857254, 571.8279983296114, 642.4240301361178,
    715.1154482656086, 789.1881907519752, 864.1794778295982, 941.0378086537161,
    1020.9302610908994, 1108.0881656670285, 1205.9133880172826, 1321.5732193452372,
    1464.0096739697128, 1643.9552789353038, 1874.3104456248968, 2169.8665996873688,
    2547.5316422320043, 3026.6779675590064, 3629.642253734835, 4382.884201385375,
    5317.308798328138, 6472.511901420577, 7894.136081659411, 9647.478400035407,
];

pub(super) const DWARF_10000_ELECTRON_PRESSURE: [f64; 64] = [
    4.7725839047925134e-05, 0.015433379450910334, 0.022438477521817955, 0.032405621784884146,
    0.04626395097846562, 0.06498973010161051, 0.08960019721484018, 0.12116115726537435,
    0.16082535834030126, 0.20989114662068598, 0.26986742614635617, 0.3425388883548087,
    0.43004538400735826, 0.5350069867975938, 0.6607047829883799, 0.8112623058216886,
    0.991741961224463, 1.208135272524464, 1.4673152191424752, 1.7770512626248085,
    2.146141222908516, 2.5846266729835956, 3.104052106272603, 3.717776531384358,
    4.441352888034577, 5.292794998917865, 6.293037723662663, 7.466529897820787,
    8.842215153326825, 10.455221662600314, 12.34968485570543, 14.581304822950084,
    17.22064366637794, 20.358945744192216, 24.115620895411187, 28.644287609403346,
    34.135592748786195, 40.83984621529147, 49.090876648863876, 59.34860594590678,
    72.14053045182268, 88.18249520941467, 108.36712976833995, 133.85617161976708,
    165.6930807382358, 204.94325255881307, 252.70500114505396, 307.22462395126865,
    370.3341371417532, 433.72231838514574, 508.91039558710634, 582.2206943575646,
    665.2787281077716, 762.1249916574259, 879.6544815827608, 1026.2226271582192,
    1210.992043410818, 1444.328864385892, 1738.3890402204986, 2108.088020084769,
    2571.0237976946223, 3149.760255810921, 3866.4577096350554, 4754.936786186169,
];
